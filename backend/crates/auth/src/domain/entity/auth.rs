//! Credentials of one account
//!
//! Held apart from `User` so nothing that lists or serializes accounts ever
//! loads a password hash. Also carries the failed-sign-in counter behind
//! the temporary lockout.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{UserId, user_password::UserPassword};

#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    /// Consecutive failures since the last success or expired lockout
    pub login_failed_count: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auth {
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked_at(Utc::now())
    }

    pub fn record_failure(&mut self) {
        self.fail_at(Utc::now());
    }

    /// Successful sign-in clears the counter and any lockout
    pub fn reset_failures(&mut self) {
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }

    /// Replace the hash, e.g. after a parameter upgrade at sign-in
    pub fn update_password(&mut self, new_password: UserPassword) {
        self.password_hash = new_password;
        self.updated_at = Utc::now();
    }

    fn locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if now < until)
    }

    fn fail_at(&mut self, now: DateTime<Utc>) {
        if self.locked_until.is_some() && !self.locked_at(now) {
            self.login_failed_count = 0;
            self.locked_until = None;
        }

        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + Duration::minutes(Self::LOCKOUT_MINUTES));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;

    fn credentials() -> Auth {
        let raw = RawPassword::new("Saffron-Kettle-42".to_string()).unwrap();
        Auth::new(UserId::new(), UserPassword::from_raw(&raw, None).unwrap())
    }

    #[test]
    fn test_fifth_failure_locks_for_fifteen_minutes() {
        let mut auth = credentials();
        let start = Utc::now();
        for _ in 1..Auth::MAX_LOGIN_FAILURES {
            auth.fail_at(start);
            assert!(!auth.locked_at(start));
        }
        auth.fail_at(start);
        assert_eq!(auth.locked_until, Some(start + Duration::minutes(15)));
        assert!(auth.locked_at(start + Duration::minutes(14)));
        assert!(!auth.locked_at(start + Duration::minutes(15)));
    }

    #[test]
    fn test_failure_after_expiry_counts_from_one() {
        let mut auth = credentials();
        let start = Utc::now();
        for _ in 0..Auth::MAX_LOGIN_FAILURES {
            auth.fail_at(start);
        }

        auth.fail_at(start + Duration::minutes(20));
        assert_eq!(auth.login_failed_count, 1);
        assert!(auth.locked_until.is_none());
    }

    #[test]
    fn test_success_clears_lockout() {
        let mut auth = credentials();
        for _ in 0..Auth::MAX_LOGIN_FAILURES {
            auth.record_failure();
        }
        assert!(auth.is_locked());

        auth.reset_failures();
        assert!(!auth.is_locked());
        assert_eq!(auth.login_failed_count, 0);
        assert!(auth.last_failed_at.is_none());
    }
}
