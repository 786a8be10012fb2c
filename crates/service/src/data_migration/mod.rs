//! One-shot ingestion of a baseline portfolio document into the settings store.
//!
//! Each top-level field of the source document becomes one setting key.

pub mod errors;
pub mod loader;
pub mod source;

pub use errors::MigrationError;
pub use loader::{MigrationLoader, MigrationPhase, MigrationReport};
pub use source::{LoadedDocument, SourceOrigin};
