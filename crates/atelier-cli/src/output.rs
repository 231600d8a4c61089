//! JSON status lines printed by every command.
//!
//! Each invocation prints a `running` line, then either a `success` line
//! carrying the command result on stdout or an `error` line on stderr:
//!
//! ```text
//! {"status":"running","message":"Evolving agent..."}
//! {"status":"success","result":{"previousGeneration":1,"newGeneration":2,...}}
//! ```

use serde::Serialize;

/// One status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusLine {
    /// The command has started.
    Running {
        /// What the command is doing.
        message: String,
    },
    /// The command finished.
    Success {
        /// The command's result.
        result: serde_json::Value,
    },
    /// The command failed.
    Error {
        /// Why it failed.
        message: String,
    },
}

impl StatusLine {
    /// Encode as a single JSON line.
    ///
    /// Falls back to a fixed error line if encoding fails, so the caller
    /// always receives parseable output.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"error","message":"failed to encode status line: {e}"}}"#)
        })
    }

    /// Print to stdout (running, success) or stderr (error).
    pub fn emit(&self) {
        match self {
            Self::Error { .. } => eprintln!("{}", self.to_json()),
            Self::Running { .. } | Self::Success { .. } => println!("{}", self.to_json()),
        }
    }
}
