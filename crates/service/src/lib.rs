//! Service layer of the portfolio backend.
//! - `settings`: the key-value document store and its backends.
//! - `data_migration`: one-shot ingestion of a baseline document into the store.
//! - `auth` and `uploads`: the thin collaborators behind the HTTP routes.
//! - `runtime`: builds and releases the shared store handles.

pub mod errors;
pub mod storage;
pub mod settings;
pub mod data_migration;
pub mod auth;
pub mod uploads;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
