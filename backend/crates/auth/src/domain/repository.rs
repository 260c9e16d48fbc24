//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use uuid::Uuid;

use crate::domain::entity::{auth::Auth, refresh_token::RefreshToken, user::User};
use crate::domain::value_object::{UserId, email::Email, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user together with its credentials
    ///
    /// Returns `UserNameTaken` / `EmailTaken` when a unique key collides.
    async fn create(&self, user: &User, auth: &Auth) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Lookup by canonical (lower-case) user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Whether any account holds the admin role
    async fn exists_admin(&self) -> AuthResult<bool>;

    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Auth credentials repository trait
#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    async fn update(&self, auth: &Auth) -> AuthResult<()>;
}

/// Issued refresh tokens
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    async fn find(&self, token_id: Uuid) -> AuthResult<Option<RefreshToken>>;

    /// Revoke one token. Returns false if it was already revoked or unknown.
    async fn revoke(&self, token_id: Uuid) -> AuthResult<bool>;

    /// Revoke every live token of a user (reuse detection, account disable)
    async fn revoke_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Delete expired rows
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
