use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::auth::domain::AuthUser;
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;
use crate::settings::{SettingsError, SettingsRepository};

/// Settings key holding the user list for the file backend.
pub const USERS_KEY: &str = "users";

/// Users stored as `[{"username", "password", ...}]` under the `users`
/// setting. Extra fields on an entry are preserved when its password changes.
///
/// Changes go through [`SettingsRepository::update`], so they serialize with
/// every other write of the section, including `POST /data`.
pub struct SettingsUserRepository {
    settings: Arc<dyn SettingsRepository>,
}

impl SettingsUserRepository {
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }

    async fn load_users(&self) -> Result<Vec<Value>, AuthError> {
        let all = self.settings.get_all().await?;
        let section = all.into_iter().find(|s| s.key == USERS_KEY).map(|s| s.value);
        match section {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(users)) => Ok(users),
            Some(other) => Err(AuthError::Repository(format!("`{USERS_KEY}` setting is not a list: {other}"))),
        }
    }
}

fn field<'a>(user: &'a Value, name: &str) -> Option<&'a str> {
    user.get(name).and_then(Value::as_str)
}

#[async_trait::async_trait]
impl UserRepository for SettingsUserRepository {
    async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
        let users = self.load_users().await?;
        Ok(users
            .iter()
            .find(|u| field(u, "username") == Some(username) && field(u, "password") == Some(password))
            .map(|_| AuthUser { username: username.to_string() }))
    }

    async fn upsert_user(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
        models::user::validate_username(username)?;
        if password.is_empty() {
            return Err(AuthError::Validation("password required".into()));
        }
        let (name, pass) = (username.to_string(), password.to_string());
        self.settings
            .update(
                USERS_KEY,
                Box::new(move |current| {
                    let mut users = match current {
                        None | Some(Value::Null) => Vec::new(),
                        Some(Value::Array(users)) => users,
                        Some(other) => {
                            return Err(SettingsError::StoreUnavailable(format!("`{USERS_KEY}` setting is not a list: {other}")))
                        }
                    };
                    match users.iter_mut().find(|u| field(u, "username") == Some(name.as_str())) {
                        Some(Value::Object(existing)) => {
                            existing.insert("password".into(), Value::String(pass));
                        }
                        _ => users.push(json!({ "username": name, "password": pass })),
                    }
                    Ok(Value::Array(users))
                }),
            )
            .await?;
        debug!(%username, "user stored in settings");
        Ok(AuthUser { username: username.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::repository::mock::MockSettingsRepository;

    #[tokio::test]
    async fn reads_users_section() {
        let store = Arc::new(MockSettingsRepository::default());
        store
            .upsert(USERS_KEY, json!([{"username": "admin", "password": "pw", "email": "a@example.com"}]))
            .await
            .unwrap();
        let repo = SettingsUserRepository::new(store);

        assert_eq!(repo.find_by_credentials("admin", "pw").await.unwrap(), Some(AuthUser { username: "admin".into() }));
        assert!(repo.find_by_credentials("admin", "nope").await.unwrap().is_none());
        assert!(repo.find_by_credentials("ghost", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_password_and_keeps_other_fields() {
        let store = Arc::new(MockSettingsRepository::default());
        store.upsert(USERS_KEY, json!([{"username": "admin", "password": "old", "email": "a@example.com"}])).await.unwrap();
        let repo = SettingsUserRepository::new(store.clone());

        repo.upsert_user("admin", "new").await.unwrap();
        repo.upsert_user("second", "pw2").await.unwrap();

        let users = &store.snapshot()[USERS_KEY];
        assert_eq!(
            users,
            &json!([
                {"username": "admin", "password": "new", "email": "a@example.com"},
                {"username": "second", "password": "pw2"}
            ])
        );
    }

    #[tokio::test]
    async fn concurrent_seeding_keeps_every_user() {
        let store = Arc::new(MockSettingsRepository::default());
        let repo = Arc::new(SettingsUserRepository::new(store.clone()));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let repo = Arc::clone(&repo);
            tasks.push(tokio::spawn(async move { repo.upsert_user(&format!("user{i}"), "pw").await }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        for i in 0..8 {
            let name = format!("user{i}");
            assert!(repo.find_by_credentials(&name, "pw").await.unwrap().is_some(), "{name} lost");
        }
    }

    #[tokio::test]
    async fn seeding_over_malformed_section_fails_without_overwriting() {
        let store = Arc::new(MockSettingsRepository::default());
        store.upsert(USERS_KEY, json!("not a list")).await.unwrap();
        let repo = SettingsUserRepository::new(store.clone());
        assert!(matches!(repo.upsert_user("admin", "pw").await, Err(AuthError::Repository(_))));
        assert_eq!(store.snapshot()[USERS_KEY], json!("not a list"));
    }

    #[tokio::test]
    async fn empty_store_has_no_users() {
        let repo = SettingsUserRepository::new(Arc::new(MockSettingsRepository::default()));
        assert!(repo.find_by_credentials("admin", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_section_is_a_repository_error() {
        let store = Arc::new(MockSettingsRepository::default());
        store.upsert(USERS_KEY, json!({"admin": "pw"})).await.unwrap();
        let repo = SettingsUserRepository::new(store);
        assert!(matches!(repo.find_by_credentials("admin", "pw").await, Err(AuthError::Repository(_))));
    }
}
