use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::domain::{AuthUser, LoginInput};
use super::errors::AuthError;
use super::repository::UserRepository;

/// Auth business service independent of web framework
#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self { Self { repo } }

    /// Check a username/password pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, domain::LoginInput, repository::mock::MockUserRepository};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockUserRepository::with_user("admin", "secret")));
    /// let user = tokio_test::block_on(svc.login(LoginInput::new("admin", "secret"))).unwrap();
    /// assert_eq!(user.username, "admin");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthUser, AuthError> {
        if input.username.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("username and password required".into()));
        }
        match self.repo.find_by_credentials(&input.username, &input.password).await? {
            Some(user) => {
                info!("login_succeeded");
                Ok(user)
            }
            None => {
                warn!("login_rejected");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Create the admin user or reset its password.
    #[instrument(skip(self, password))]
    pub async fn seed_user(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation("username and password required".into()));
        }
        let user = self.repo.upsert_user(username, password).await?;
        info!("user_seeded");
        Ok(user)
    }
}
