use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationError {
    /// Recovered by falling back to the embedded default; only logged.
    #[error("migration source {} unreadable: {reason}", .path.display())]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("embedded default document is invalid: {0}")]
    EmbeddedDefault(String),
    #[error("migration failed for {} key(s): {}", .failed_keys.len(), .failed_keys.join(", "))]
    PartialFailure { failed_keys: Vec<String> },
}
