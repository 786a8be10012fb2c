//! Persistence backends for [`SettingsRepository`](super::SettingsRepository).

pub mod file;
pub mod seaorm;

pub use file::JsonFileSettingsRepository;
pub use seaorm::SeaOrmSettingsRepository;
