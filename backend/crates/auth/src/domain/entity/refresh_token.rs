//! Refresh Token Entity
//!
//! Server-side record of an issued refresh token, keyed by its `jti`. The
//! token itself is never stored; only the ID it carries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    /// `jti` claim of the issued token
    pub token_id: Uuid,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    /// Set on rotation or sign-out
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(token_id: Uuid, user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_id,
            user_id,
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
