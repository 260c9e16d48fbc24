//! Bootstrap Admin Use Case
//!
//! Creates the first administrator at startup so that a fresh database can
//! be managed. Does nothing once any admin exists.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::sign_up::{SignUpInput, SignUpUseCase};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthResult;

pub struct BootstrapAdminInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

pub struct BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Returns true when an admin was created
    pub async fn execute(&self, input: BootstrapAdminInput) -> AuthResult<bool> {
        if self.user_repo.exists_admin().await? {
            tracing::debug!("Admin account already present, skipping bootstrap");
            return Ok(false);
        }

        let sign_up = SignUpUseCase::new(self.user_repo.clone(), self.config.clone());
        let admin = sign_up
            .register(
                SignUpInput {
                    user_name: input.user_name,
                    email: input.email,
                    password: input.password,
                },
                UserRole::Admin,
            )
            .await?;

        tracing::info!(user_id = %admin.user_id, user_name = %admin.user_name, "Bootstrap admin created");
        Ok(true)
    }
}
