use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::errors::ServiceError;
use models::errors::ModelError;

/// Failures of a single store operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("invalid setting key: {0}")]
    InvalidKey(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl SettingsError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SettingsError::InvalidKey(_) => 2001,
            SettingsError::StoreUnavailable(_) => 2101,
            SettingsError::Cancelled => 2201,
            SettingsError::DeadlineExceeded(_) => 2202,
        }
    }

    /// Whether the caller, not the store, is at fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, SettingsError::InvalidKey(_))
    }
}

impl From<ModelError> for SettingsError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => SettingsError::InvalidKey(msg),
            ModelError::Db(msg) => SettingsError::StoreUnavailable(msg),
        }
    }
}

impl From<ServiceError> for SettingsError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => SettingsError::InvalidKey(msg),
            ServiceError::Storage(msg) => SettingsError::StoreUnavailable(msg),
            ServiceError::Model(m) => m.into(),
        }
    }
}

/// Outcome of a bulk upsert in which at least one entry failed.
///
/// Entries listed in `applied` are durably stored; nothing is rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpsertError {
    pub applied: Vec<String>,
    pub failed: BTreeMap<String, SettingsError>,
}

impl BulkUpsertError {
    pub fn failed_keys(&self) -> Vec<String> {
        self.failed.keys().cloned().collect()
    }

    /// True when every failure was a rejected key.
    pub fn only_caller_errors(&self) -> bool {
        self.failed.values().all(SettingsError::is_caller_error)
    }
}

impl fmt::Display for BulkUpsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to apply {} setting(s):", self.failed.len())?;
        for (key, err) in &self.failed {
            write!(f, " [{key}: {err}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for BulkUpsertError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_error_names_failed_keys() {
        let mut failed = BTreeMap::new();
        failed.insert("skills".to_string(), SettingsError::StoreUnavailable("down".into()));
        failed.insert("".to_string(), SettingsError::InvalidKey("empty".into()));
        let err = BulkUpsertError { applied: vec!["profile".into()], failed };

        assert_eq!(err.failed_keys(), vec!["".to_string(), "skills".to_string()]);
        assert!(!err.only_caller_errors());
        let msg = err.to_string();
        assert!(msg.starts_with("failed to apply 2 setting(s):"));
        assert!(msg.contains("skills: settings store unavailable: down"));
    }

    #[test]
    fn model_errors_map_to_taxonomy() {
        let e: SettingsError = ModelError::Db("connection refused".into()).into();
        assert_eq!(e.code(), 2101);
        let e: SettingsError = ModelError::Validation("empty".into()).into();
        assert!(e.is_caller_error());
    }
}
