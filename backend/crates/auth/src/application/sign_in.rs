//! Sign In Use Case
//!
//! Verifies credentials and issues a token pair.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::{TokenPair, TokenService};
use crate::domain::entity::{refresh_token::RefreshToken, user::User};
use crate::domain::repository::{AuthRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    /// User name or email
    pub identifier: String,
    pub password: String,
}

pub struct SignInOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct SignInUseCase<R>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let password = RawPassword::for_sign_in(input.password);

        let Some(mut user) = self.find_user(&input.identifier).await? else {
            password.burn_verification();
            return Err(AuthError::InvalidCredentials);
        };

        let mut auth = AuthRepository::find_by_user_id(&*self.repo, &user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;

        if auth.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        if !auth.password_hash.verify(&password, self.config.pepper()) {
            auth.record_failure();
            AuthRepository::update(&*self.repo, &auth).await?;
            if auth.is_locked() {
                tracing::warn!(user_id = %user.user_id, "Account locked after repeated failures");
            }
            return Err(AuthError::InvalidCredentials);
        }

        // Checked after the password so a disabled account is not an oracle
        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        auth.reset_failures();
        if auth.password_hash.needs_rehash() {
            auth.update_password(UserPassword::from_raw(&password, self.config.pepper())?);
        }
        AuthRepository::update(&*self.repo, &auth).await?;

        user.record_login();
        UserRepository::update(&*self.repo, &user).await?;

        let tokens = self.tokens.issue_pair(&user)?;
        let record = RefreshToken::new(tokens.refresh_jti, user.user_id, tokens.refresh_expires_at);
        RefreshTokenRepository::create(&*self.repo, &record).await?;

        tracing::info!(user_id = %user.user_id, role = %user.user_role, "User signed in");

        Ok(SignInOutput { user, tokens })
    }

    async fn find_user(&self, identifier: &str) -> AuthResult<Option<User>> {
        if identifier.contains('@') {
            match Email::new(identifier) {
                Ok(email) => self.repo.find_by_email(&email).await,
                Err(_) => Ok(None),
            }
        } else {
            self.repo
                .find_by_user_name(&UserName::for_lookup(identifier))
                .await
        }
    }
}
