//! Persistence backends for [`UserRepository`](super::repository::UserRepository).

pub mod seaorm;
pub mod settings;

pub use seaorm::SeaOrmUserRepository;
pub use settings::SettingsUserRepository;
