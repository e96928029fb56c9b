//! Error types for nfoforge-probe.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running or interpreting ffprobe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The probe executable could not be spawned.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The probe exited with a non-zero status.
    #[error("{tool} exited with failure: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    /// The probe printed something that is not the expected report.
    #[error("unexpected {tool} output: {message}")]
    InvalidOutput { tool: String, message: String },

    /// The video to probe does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            stderr: stderr.into(),
        }
    }

    pub fn invalid_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
