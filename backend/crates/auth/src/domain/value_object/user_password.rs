//! User Password Value Object
//!
//! Domain wrapper over `platform::password`. The platform crate owns the
//! Argon2id parameters and the policy checks; this module adds the
//! user-facing wording.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//!
//! let raw = RawPassword::new("Saffron-Kettle-42".to_string()).unwrap();
//! let hashed = UserPassword::from_raw(&raw, None).unwrap();
//! assert!(hashed.verify(&raw, None));
//! ```

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    ClearTextPassword, HashedPassword, Pepper, PasswordPolicyError, dummy_verify,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password as typed by the user. Zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a new password (sign-up, bootstrap admin)
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(policy_error)?;
        Ok(Self(clear_text))
    }

    /// Wrap a sign-in attempt without applying the policy
    pub fn for_sign_in(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    /// Spend the same hashing time as a real verification
    pub fn burn_verification(&self) {
        dummy_verify(&self.0);
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    let action = match err {
        PasswordPolicyError::TooShort { .. } => "Please choose a longer password",
        PasswordPolicyError::TooLong { .. } => "Please choose a shorter password",
        PasswordPolicyError::EmptyOrWhitespace => "Please enter a password",
        PasswordPolicyError::InvalidCharacter => "Please remove any control characters",
        PasswordPolicyError::CommonPattern => "Please choose a less predictable password",
    };
    AppError::from(err).with_action(action)
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id PHC string, safe to store
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&Pepper>) -> AppResult<Self> {
        Ok(Self(raw.0.hash(pepper)?))
    }

    /// Load from the database
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))?;
        Ok(Self(hashed))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// `pepper` must be the one used when hashing
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&Pepper>) -> bool {
        self.0.verify(&raw.0, pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("Saffron-Kettle-42".to_string()).is_ok());

        use platform::password::MIN_PASSWORD_LENGTH;
        let short = "a1".repeat(MIN_PASSWORD_LENGTH / 2 - 1);
        let err = RawPassword::new(short).unwrap_err();
        assert_eq!(err.param(), Some("password"));
        assert_eq!(err.action(), Some("Please choose a longer password"));

        let err = RawPassword::new("password123".to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_sign_in_skips_policy() {
        // Too short for sign-up, but a sign-in attempt must still be checkable
        let attempt = RawPassword::for_sign_in("short".to_string());
        let raw = RawPassword::new("Saffron-Kettle-42".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(!hashed.verify(&attempt, None));
    }

    #[test]
    fn test_hash_and_verify_with_pepper() {
        let pepper = Pepper::new(b"storefront-pepper".to_vec());
        let raw = RawPassword::new("Saffron-Kettle-42".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, Some(&pepper)).unwrap();

        assert!(hashed.verify(&raw, Some(&pepper)));
        assert!(!hashed.verify(&raw, None));

        let typed = RawPassword::for_sign_in("Saffron-Kettle-42".to_string());
        assert!(hashed.verify(&typed, Some(&pepper)));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("Saffron-Kettle-42".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));
        assert_eq!(
            UserPassword::from_phc_string("plain").unwrap_err().status_code(),
            500
        );
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("Saffron-Kettle-42".to_string()).unwrap();
        assert!(!format!("{:?}", raw).contains("Saffron"));
        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(format!("{:?}", hashed).contains("[HASH]"));
    }
}
