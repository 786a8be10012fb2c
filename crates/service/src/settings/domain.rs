use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::SettingsError;

/// A setting's value: any JSON document, nested to any depth.
pub type Document = serde_json::Value;

/// Snapshot of the store, ordered by key.
pub type SettingsMap = BTreeMap<String, Document>;

/// Portfolio sections seeded by the data migration.
pub const SECTION_KEYS: [&str; 6] = ["profile", "users", "projects", "experience", "skills", "messages"];

/// One stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: Document,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: Document) -> Self {
        Self { key: key.into(), value }
    }
}

/// Keys must be non-blank and fit the `setting.key` column.
pub fn validate_key(key: &str) -> Result<(), SettingsError> {
    models::setting::validate_key(key).map_err(|e| SettingsError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_rules() {
        assert!(validate_key("profile").is_ok());
        assert!(matches!(validate_key(""), Err(SettingsError::InvalidKey(_))));
        assert!(matches!(validate_key(" \t"), Err(SettingsError::InvalidKey(_))));
        assert!(validate_key(&"x".repeat(256)).is_err());
    }
}
