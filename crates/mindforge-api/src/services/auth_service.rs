//! Accounts: registration, login, password and profile changes.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use tracing::info;

use mindforge_core::{
    defaults, Error, Page, PageRequest, Result, StorageBackend, User, UserRepository,
};
use mindforge_db::storage_key;

use super::TokenCache;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::JwtKeys;

/// Token handed out by register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: String,
    pub user_id: i64,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    storage: Arc<dyn StorageBackend>,
    jwt: JwtKeys,
    tokens: TokenCache,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        storage: Arc<dyn StorageBackend>,
        jwt: JwtKeys,
        tokens: TokenCache,
    ) -> Self {
        Self {
            users,
            storage,
            jwt,
            tokens,
        }
    }

    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    async fn issue(&self, user_id: i64) -> Result<AuthToken> {
        let token = self.jwt.issue(user_id)?;
        self.tokens.store(user_id, &token).await;
        Ok(AuthToken { token, user_id })
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthToken> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "email and password are required".to_string(),
            ));
        }
        if self.users.get_by_email(email).await?.is_some() {
            return Err(Error::InvalidInput("email already registered".to_string()));
        }

        let hash = hash_password(password).await?;
        let user_id = match self.users.insert(email, &hash).await {
            Ok(id) => id,
            // Lost a race with a concurrent registration.
            Err(e) if e.is_duplicate_key() => {
                return Err(Error::InvalidInput("email already registered".to_string()))
            }
            Err(e) => return Err(e),
        };
        info!(subsystem = "auth", user_id, "User registered");

        self.issue(user_id).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        let credentials = self
            .users
            .credentials_by_email(email.trim())
            .await?
            .ok_or_else(|| Error::InvalidInput("user not found".to_string()))?;

        if !verify_password(password, &credentials.password_hash).await? {
            return Err(Error::InvalidInput("wrong password".to_string()));
        }

        // issue() overwrites the cached token.
        self.issue(credentials.id).await
    }

    pub async fn change_password(&self, user_id: i64, old: &str, new: &str) -> Result<()> {
        if new.is_empty() {
            return Err(Error::InvalidInput("new password is required".to_string()));
        }
        let credentials = self
            .users
            .credentials_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;

        if !verify_password(old, &credentials.password_hash).await? {
            return Err(Error::InvalidInput("wrong password".to_string()));
        }

        let hash = hash_password(new).await?;
        self.users.update_password(user_id, &hash).await?;
        info!(subsystem = "auth", user_id, "Password changed");
        Ok(())
    }

    /// Admin reset by email.
    pub async fn reset_password(&self, email: &str, new: &str) -> Result<()> {
        if new.is_empty() {
            return Err(Error::InvalidInput("new password is required".to_string()));
        }
        let hash = hash_password(new).await?;
        if !self.users.update_password_by_email(email.trim(), &hash).await? {
            return Err(Error::NotFound("user not found".to_string()));
        }
        Ok(())
    }

    /// Store the image and point the user's avatar at it. Returns the URL.
    pub async fn update_avatar(&self, user_id: i64, file_name: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::InvalidInput("avatar file is empty".to_string()));
        }
        let key = storage_key(defaults::AVATARS_PREFIX, file_name);
        let url = self.storage.put(&key, data).await?;

        if !self.users.update_avatar(user_id, &url).await? {
            return Err(Error::NotFound("user not found".to_string()));
        }
        Ok(url)
    }

    pub async fn avatar(&self, user_id: i64) -> Result<Option<String>> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;
        Ok(user.avatar_url)
    }

    pub async fn update_email(&self, user_id: i64, email: &str) -> Result<()> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(Error::InvalidInput("invalid email format".to_string()));
        }
        if let Some(existing) = self.users.get_by_email(email).await? {
            if existing.id != user_id {
                return Err(Error::Conflict("email already in use".to_string()));
            }
        }
        if !self.users.update_email(user_id, email).await? {
            return Err(Error::NotFound("user not found".to_string()));
        }
        Ok(())
    }

    pub async fn user(&self, user_id: i64) -> Result<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))
    }

    pub async fn user_by_email(&self, email: &str) -> Result<User> {
        self.users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))
    }

    pub async fn list_users(&self, req: PageRequest) -> Result<Page<User>> {
        self.users.list_page(req).await
    }

    /// Delete the user and everything they own, then drop their cached token.
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        if !self.users.delete_cascade(user_id).await? {
            return Err(Error::NotFound("user not found".to_string()));
        }
        self.tokens.invalidate(user_id).await;
        info!(subsystem = "auth", user_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FakeStorage, FakeUsers};

    fn service(users: Arc<FakeUsers>) -> AuthService {
        AuthService::new(
            users,
            Arc::new(FakeStorage::default()),
            JwtKeys::new("test-secret", 3600),
            TokenCache::disabled(),
        )
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@c.d"));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let users = Arc::new(FakeUsers::default());
        let auth = service(users.clone());

        let registered = auth.register("ada@example.com", "pw").await.unwrap();
        assert_eq!(auth.jwt().verify(&registered.token).unwrap(), registered.user_id);

        let logged_in = auth.login("ada@example.com", "pw").await.unwrap();
        assert_eq!(logged_in.user_id, registered.user_id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let auth = service(Arc::new(FakeUsers::default()));
        auth.register("ada@example.com", "pw").await.unwrap();

        let err = auth.register("ada@example.com", "other").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m == "email already registered"));
    }

    #[tokio::test]
    async fn test_empty_credentials_are_rejected() {
        let auth = service(Arc::new(FakeUsers::default()));
        assert!(matches!(
            auth.register("", "pw").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            auth.register("a@b.co", "").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let auth = service(Arc::new(FakeUsers::default()));
        auth.register("ada@example.com", "pw").await.unwrap();

        let unknown = auth.login("bob@example.com", "pw").await.unwrap_err();
        assert!(matches!(unknown, Error::InvalidInput(ref m) if m == "user not found"));

        let wrong = auth.login("ada@example.com", "nope").await.unwrap_err();
        assert!(matches!(wrong, Error::InvalidInput(ref m) if m == "wrong password"));
    }

    #[tokio::test]
    async fn test_change_password_requires_old_password() {
        let auth = service(Arc::new(FakeUsers::default()));
        let id = auth.register("ada@example.com", "old").await.unwrap().user_id;

        assert!(matches!(
            auth.change_password(id, "bad", "new").await,
            Err(Error::InvalidInput(_))
        ));
        auth.change_password(id, "old", "new").await.unwrap();
        auth.login("ada@example.com", "new").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email() {
        let auth = service(Arc::new(FakeUsers::default()));
        assert!(matches!(
            auth.reset_password("ghost@example.com", "x").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_email_rules() {
        let auth = service(Arc::new(FakeUsers::default()));
        let ada = auth.register("ada@example.com", "pw").await.unwrap().user_id;
        auth.register("bob@example.com", "pw").await.unwrap();

        assert!(matches!(
            auth.update_email(ada, "not-an-email").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            auth.update_email(ada, "bob@example.com").await,
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            auth.update_email(999, "new@example.com").await,
            Err(Error::NotFound(_))
        ));
        auth.update_email(ada, "ada@new.example").await.unwrap();
        assert_eq!(auth.user(ada).await.unwrap().email, "ada@new.example");
    }

    #[tokio::test]
    async fn test_avatar_is_stored_and_persisted() {
        let auth = service(Arc::new(FakeUsers::default()));
        let id = auth.register("ada@example.com", "pw").await.unwrap().user_id;

        let url = auth.update_avatar(id, "me.png", b"png").await.unwrap();
        assert!(url.contains("avatars/"));
        assert_eq!(auth.avatar(id).await.unwrap(), Some(url));
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let auth = service(Arc::new(FakeUsers::default()));
        assert!(matches!(auth.delete_user(5).await, Err(Error::NotFound(_))));
    }
}
