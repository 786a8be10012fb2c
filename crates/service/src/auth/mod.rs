//! Auth module: three-layer architecture (domain, repository, service).
//!
//! A single admin account checked against stored credentials. Users live in
//! the `portfolio_user` table on PostgreSQL, or in the `users` settings
//! section when the store is file-backed.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use errors::AuthError;
pub use service::AuthService;
