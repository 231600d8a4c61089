//! Storage backends for the evolution state record.
//!
//! A [`StateStore`] moves the raw serialized record in and out of durable
//! storage. Parsing, default-fill, and validation live in
//! [`crate::state`]; stores only deal in text.
//!
//! - [`FileStateStore`] -- the production store: a pretty-printed JSON file
//!   (default `config/evolution.json`) replaced atomically on every write.
//! - [`MemoryStateStore`] -- an in-process store for tests and embedders.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default state file location, relative to the project root.
pub const DEFAULT_STATE_PATH: &str = "config/evolution.json";

/// Durable storage for the serialized state record.
pub trait StateStore {
    /// Read the stored record. Returns `Ok(None)` when nothing has been
    /// stored yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the stored record with `contents`.
    ///
    /// After a successful return, the next [`StateStore::read`] observes
    /// exactly `contents`; after a failed one, it observes the previous
    /// record.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// Human-readable location, used in logs and errors.
    fn location(&self) -> String;
}

/// JSON-file store.
///
/// Writes go to a sibling temporary file which is flushed, synced, and then
/// renamed over the target, so readers never see a half-written record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for FileStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_PATH)
    }
}

impl StateStore for FileStateStore {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let temp = self.temp_path();
        let result = write_synced(&temp, contents).and_then(|()| fs::rename(&temp, &self.path));
        if result.is_err() {
            // The target is untouched; only the scratch file needs cleaning.
            fs::remove_file(&temp).ok();
        }
        result
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write `contents` to `path` and sync it to disk before returning.
///
/// The file handle is closed on every exit path when it drops.
fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.sync_all()
}

/// In-memory store.
///
/// Starts empty (equivalent to a missing state file) unless seeded with
/// [`MemoryStateStore::with_contents`].
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            contents: Mutex::new(None),
        }
    }

    /// Create a store pre-loaded with a raw record.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// The currently stored record, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self) -> io::Result<Option<String>> {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| io::Error::other(format!("memory store poisoned: {e}")))
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|e| io::Error::other(format!("memory store poisoned: {e}")))?;
        *guard = Some(contents.to_owned());
        Ok(())
    }

    fn location(&self) -> String {
        String::from("memory")
    }
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        (**self).write(contents)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let store = FileStateStore::new(dir.path().join("evolution.json"));
        assert!(matches!(store.read(), Ok(None)));
    }

    #[test]
    fn write_creates_parent_directories() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let path = dir.path().join("nested").join("config").join("evolution.json");
        let store = FileStateStore::new(&path);

        assert!(store.write("{\"generation\": 2}").is_ok());
        assert!(path.exists());
        assert_eq!(
            store.read().ok().flatten().as_deref(),
            Some("{\"generation\": 2}")
        );
    }

    #[test]
    fn write_replaces_whole_record_and_leaves_no_temp_file() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let store = FileStateStore::new(dir.path().join("evolution.json"));

        assert!(store.write("first record, quite long").is_ok());
        assert!(store.write("second").is_ok());
        assert_eq!(store.read().ok().flatten().as_deref(), Some("second"));
        assert!(!dir.path().join("evolution.json.tmp").exists());
    }

    #[test]
    fn write_into_unwritable_location_fails() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("config");
        std::fs::write(&blocker, "not a directory").ok();
        let store = FileStateStore::new(blocker.join("evolution.json"));

        assert!(store.write("{}").is_err());
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStateStore::new();
        assert!(matches!(store.read(), Ok(None)));
        assert!(store.write("abc").is_ok());
        assert_eq!(store.contents().as_deref(), Some("abc"));
        assert_eq!(store.location(), "memory");
    }

    #[test]
    fn memory_store_can_be_seeded() {
        let store = MemoryStateStore::with_contents("{}");
        assert_eq!(store.read().ok().flatten().as_deref(), Some("{}"));
    }

    #[test]
    fn file_store_location_is_path() {
        let store = FileStateStore::default();
        assert_eq!(store.location(), DEFAULT_STATE_PATH);
        assert_eq!(store.path(), Path::new(DEFAULT_STATE_PATH));
    }
}
