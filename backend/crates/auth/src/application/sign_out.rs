//! Sign Out Use Case
//!
//! Revokes the presented refresh token. Idempotent: unknown, expired or
//! already revoked tokens are not an error.

use std::sync::Arc;

use crate::application::token::TokenService;
use crate::domain::repository::RefreshTokenRepository;
use crate::error::AuthResult;

pub struct SignOutUseCase<R>
where
    R: RefreshTokenRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> SignOutUseCase<R>
where
    R: RefreshTokenRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<()> {
        let Ok(claims) = self.tokens.decode_refresh(refresh_token) else {
            return Ok(());
        };

        if self.repo.revoke(claims.jti).await? {
            tracing::info!(user_id = %claims.sub, "User signed out");
        }

        Ok(())
    }
}
