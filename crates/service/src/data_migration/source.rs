use std::path::{Path, PathBuf};

use super::errors::MigrationError;
use crate::settings::domain::{Document, SettingsMap};

/// Baseline document compiled into the binary.
pub const EMBEDDED_DEFAULT: &str = include_str!("../../assets/default_portfolio.json");

/// Where the migrated document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    EmbeddedDefault,
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub origin: SourceOrigin,
    pub sections: SettingsMap,
}

/// Split a JSON document into its top-level fields.
///
/// Anything other than a JSON object at the top level is rejected.
pub fn parse_sections(bytes: &[u8]) -> Result<SettingsMap, String> {
    match serde_json::from_slice::<Document>(bytes).map_err(|e| e.to_string())? {
        Document::Object(fields) => Ok(fields.into_iter().collect()),
        other => Err(format!("top level must be an object, found {}", kind(&other))),
    }
}

fn kind(doc: &Document) -> &'static str {
    match doc {
        Document::Null => "null",
        Document::Bool(_) => "a boolean",
        Document::Number(_) => "a number",
        Document::String(_) => "a string",
        Document::Array(_) => "an array",
        Document::Object(_) => "an object",
    }
}

pub async fn read_file(path: &Path) -> Result<SettingsMap, MigrationError> {
    let unreadable = |reason: String| MigrationError::SourceUnreadable { path: path.to_path_buf(), reason };
    let bytes = tokio::fs::read(path).await.map_err(|e| unreadable(e.to_string()))?;
    parse_sections(&bytes).map_err(unreadable)
}

pub fn embedded_default() -> Result<SettingsMap, MigrationError> {
    parse_sections(EMBEDDED_DEFAULT.as_bytes()).map_err(MigrationError::EmbeddedDefault)
}
