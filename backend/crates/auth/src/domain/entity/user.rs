//! User Entity
//!
//! Identity and role. Credentials live in the `Auth` entity.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_role::UserRole, user_status::UserStatus,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, used for sign-in and display
    pub user_name: UserName,
    /// Unique, also accepted at sign-in
    pub email: Email,
    pub user_role: UserRole,
    pub user_status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New account with the given role (sign-up passes `Customer`)
    pub fn new(user_name: UserName, email: Email, user_role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            user_role,
            user_status: UserStatus::default(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn can_login(&self) -> bool {
        self.user_status.can_login()
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.user_status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            UserRole::Customer,
        )
    }

    #[test]
    fn test_new_user_is_active() {
        let user = user();
        assert!(user.can_login());
        assert!(user.last_login_at.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_disabled_user_cannot_login() {
        let mut user = user();
        user.set_status(UserStatus::Disabled);
        assert!(!user.can_login());
    }

    #[test]
    fn test_record_login() {
        let mut user = user();
        user.record_login();
        assert_eq!(user.last_login_at, Some(user.updated_at));
    }
}
