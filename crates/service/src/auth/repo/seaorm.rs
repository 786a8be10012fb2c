use sea_orm::DatabaseConnection;

use crate::auth::domain::AuthUser;
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;

/// Users in the `portfolio_user` table.
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_credentials(&self.db, username, password).await?;
        Ok(res.map(|u| AuthUser { username: u.username }))
    }

    async fn upsert_user(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
        let u = models::user::upsert(&self.db, username, password).await?;
        Ok(AuthUser { username: u.username })
    }
}
