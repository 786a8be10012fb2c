//! Settings store: schema-less JSON documents addressed by string key.
//!
//! Same layering as `auth`: domain types, a repository trait with one
//! implementation per persistence medium, and a service adding key
//! validation, deadlines, cancellation and bulk writes on top.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{Document, Setting, SettingsMap};
pub use errors::{BulkUpsertError, SettingsError};
pub use repository::SettingsRepository;
pub use service::{SettingsService, SettingsServiceConfig};
