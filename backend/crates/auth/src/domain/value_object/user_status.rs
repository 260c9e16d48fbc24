//! Whether an account may sign in at all
//!
//! Lockouts after failed attempts are temporary and tracked on `Auth`;
//! this is the administrator's switch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored as `users.user_status SMALLINT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    /// Cannot sign in or rotate refresh tokens
    Disabled,
}

impl UserStatus {
    pub const fn id(self) -> i16 {
        match self {
            UserStatus::Active => 0,
            UserStatus::Disabled => 1,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        [UserStatus::Active, UserStatus::Disabled]
            .into_iter()
            .find(|status| status.id() == id)
    }

    pub const fn can_login(self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserStatus::Active => "active",
            UserStatus::Disabled => "disabled",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_accounts_sign_in() {
        assert_eq!(UserStatus::default(), UserStatus::Active);
        assert!(UserStatus::Active.can_login());
        assert!(!UserStatus::Disabled.can_login());
    }

    #[test]
    fn test_storage_ids() {
        assert_eq!(UserStatus::from_id(UserStatus::Disabled.id()), Some(UserStatus::Disabled));
        assert_eq!(UserStatus::from_id(0), Some(UserStatus::Active));
        assert_eq!(UserStatus::from_id(7), None);
    }

    #[test]
    fn test_json_matches_display() {
        let json = serde_json::to_string(&UserStatus::Disabled).unwrap();
        assert_eq!(json, format!("\"{}\"", UserStatus::Disabled));
    }
}
