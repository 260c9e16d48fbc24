//! Refresh Use Case
//!
//! Rotates a refresh token. Every refresh token is single-use: presenting
//! one that was already rotated means it leaked, so every live token of the
//! user is revoked and the caller must sign in again.

use std::sync::Arc;

use crate::application::token::{TokenPair, TokenService};
use crate::domain::entity::{refresh_token::RefreshToken, user::User};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct RefreshOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct RefreshUseCase<R>
where
    R: UserRepository + RefreshTokenRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> RefreshUseCase<R>
where
    R: UserRepository + RefreshTokenRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<RefreshOutput> {
        let claims = self.tokens.decode_refresh(refresh_token)?;

        let record = self
            .repo
            .find(claims.jti)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if record.user_id != claims.user_id() || record.is_expired() {
            return Err(AuthError::InvalidToken);
        }

        if record.is_revoked() {
            let revoked = self.repo.revoke_all_for_user(&record.user_id).await?;
            tracing::warn!(
                user_id = %record.user_id,
                token_id = %record.token_id,
                revoked,
                "Revoked refresh token presented again; revoked all sessions"
            );
            return Err(AuthError::RefreshTokenReused);
        }

        // Two concurrent refreshes with the same token: only one wins
        if !self.repo.revoke(record.token_id).await? {
            return Err(AuthError::RefreshTokenReused);
        }

        let user = self
            .repo
            .find_by_id(&record.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        // Role comes from the stored user, so a role change applies on refresh
        let tokens = self.tokens.issue_pair(&user)?;
        let next = RefreshToken::new(tokens.refresh_jti, user.user_id, tokens.refresh_expires_at);
        RefreshTokenRepository::create(&*self.repo, &next).await?;

        tracing::debug!(user_id = %user.user_id, "Refresh token rotated");

        Ok(RefreshOutput { user, tokens })
    }
}
