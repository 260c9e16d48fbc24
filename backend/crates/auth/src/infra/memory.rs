//! In-memory repositories
//!
//! Backs router and use-case tests without a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::{auth::Auth, refresh_token::RefreshToken, user::User};
use crate::domain::repository::{AuthRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{UserId, email::Email, user_name::UserName, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, Auth>,
    refresh_tokens: HashMap<Uuid, RefreshToken>,
}

#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh_tokens_of(&self, user_id: &UserId) -> Vec<RefreshToken> {
        self.tables
            .read()
            .await
            .refresh_tokens
            .values()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User, auth: &Auth) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.user_name.canonical() == user.user_name.canonical())
        {
            return Err(AuthError::UserNameTaken);
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        tables.users.insert(user.user_id, user.clone());
        tables.credentials.insert(auth.user_id, auth.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self.find_by_user_name(user_name).await?.is_some())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn exists_admin(&self) -> AuthResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .any(|u| u.user_role == UserRole::Admin))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.tables
            .write()
            .await
            .users
            .insert(user.user_id, user.clone());
        Ok(())
    }
}

impl AuthRepository for MemoryAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        Ok(self.tables.read().await.credentials.get(user_id).cloned())
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        self.tables
            .write()
            .await
            .credentials
            .insert(auth.user_id, auth.clone());
        Ok(())
    }
}

impl RefreshTokenRepository for MemoryAuthRepository {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        self.tables
            .write()
            .await
            .refresh_tokens
            .insert(token.token_id, token.clone());
        Ok(())
    }

    async fn find(&self, token_id: Uuid) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tables.read().await.refresh_tokens.get(&token_id).cloned())
    }

    async fn revoke(&self, token_id: Uuid) -> AuthResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(&token_id) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut revoked = 0;
        for token in tables.refresh_tokens.values_mut() {
            if &token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tables.refresh_tokens.len()) as u64)
    }
}
