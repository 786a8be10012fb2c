use async_trait::async_trait;

use super::domain::AuthUser;
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The user whose username and password both match exactly.
    async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Create the user or replace its password.
    async fn upsert_user(&self, username: &str, password: &str) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<String, String>>, // username -> password
        offline: AtomicBool,
    }

    impl MockUserRepository {
        pub fn with_user(username: &str, password: &str) -> Self {
            let repo = Self::default();
            if let Ok(mut users) = repo.users.lock() {
                users.insert(username.to_string(), password.to_string());
            }
            repo
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn check_online(&self) -> Result<(), AuthError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(AuthError::Repository("mock repository offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
            self.check_online()?;
            let users = self.users.lock().map_err(|_| AuthError::Repository("mock lock poisoned".into()))?;
            Ok(users
                .get(username)
                .filter(|p| p.as_str() == password)
                .map(|_| AuthUser { username: username.to_string() }))
        }

        async fn upsert_user(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
            self.check_online()?;
            let mut users = self.users.lock().map_err(|_| AuthError::Repository("mock lock poisoned".into()))?;
            users.insert(username.to_string(), password.to_string());
            Ok(AuthUser { username: username.to_string() })
        }
    }
}
