//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores shared by the settings file backend.

pub mod json_map_store;
