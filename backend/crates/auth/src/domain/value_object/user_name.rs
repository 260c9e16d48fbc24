//! Public handle used to sign in and shown in the back office
//!
//! Input is NFKC-normalized and trimmed, then checked in lower case.
//! The typed casing is kept for display; uniqueness and lookups use the
//! lower-cased canonical form. Allowed: `a-z`, `0-9`, `_`, `.`, `-`,
//! 3 to 30 characters, no leading or trailing `.`/`-`, no `..`, and not a
//! reserved word.

use kernel::error::app_error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Shop-operator titles, route segments and placeholder values
const RESERVED_WORDS: &[&str] = &[
    "admin", "administrator", "root", "system", "staff", "support", "help", "owner", "official",
    "api", "auth", "signin", "signout", "signup", "refresh", "me", "mine", "products", "orders",
    "customers", "checkout", "cart", "uploads", "null", "undefined", "anonymous", "guest", "test",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name cannot be empty")]
    Empty,

    #[error("User name is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("User name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Invalid character '{ch}' at position {position}. Only a-z, 0-9, _, ., - are allowed")]
    InvalidCharacter { ch: char, position: usize },

    #[error("User name must start and end with a-z, 0-9, or _")]
    InvalidBoundary,

    #[error("User name cannot contain consecutive dots (..)")]
    ConsecutiveDots,

    #[error("'{0}' is a reserved user name")]
    Reserved(String),
}

impl From<UserNameError> for AppError {
    fn from(err: UserNameError) -> Self {
        AppError::bad_request(err.to_string()).with_param("userName")
    }
}

/// Validated user name, in typed and canonical form
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        Self::new_with_reserved(input, RESERVED_WORDS)
    }

    /// Bootstrap passes `&[]` so the operator account may be called `admin`
    pub fn new_with_reserved(
        input: impl AsRef<str>,
        reserved_words: &[&str],
    ) -> Result<Self, UserNameError> {
        let lookup = Self::for_lookup(input);
        validate(&lookup.canonical, reserved_words)?;
        Ok(lookup)
    }

    /// Sign-in identifiers are normalized but never rejected here; an
    /// unknown name simply finds no account
    pub fn for_lookup(input: impl AsRef<str>) -> Self {
        let normalized: String = input.as_ref().nfkc().collect();
        Self::from_db(normalized.trim())
    }

    /// Stored names were validated when written
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            canonical: original.to_lowercase(),
            original,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn validate(canonical: &str, reserved_words: &[&str]) -> Result<(), UserNameError> {
    let length = canonical.chars().count();
    match length {
        0 => return Err(UserNameError::Empty),
        n if n < USER_NAME_MIN_LENGTH => {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        n if n > USER_NAME_MAX_LENGTH => {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }
        _ => {}
    }

    if let Some((position, ch)) = canonical.chars().enumerate().find(|&(_, c)| !allowed(c)) {
        return Err(UserNameError::InvalidCharacter { ch, position });
    }

    // `.` and `-` only inside the name
    let edge = |c: Option<char>| c.is_some_and(|c| allowed(c) && !matches!(c, '.' | '-'));
    if !edge(canonical.chars().next()) || !edge(canonical.chars().last()) {
        return Err(UserNameError::InvalidBoundary);
    }

    if canonical.contains("..") {
        return Err(UserNameError::ConsecutiveDots);
    }

    match reserved_words.contains(&canonical) {
        true => Err(UserNameError::Reserved(canonical.to_string())),
        false => Ok(()),
    }
}

fn allowed(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.original).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(input: &str) -> UserNameError {
        UserName::new(input).unwrap_err()
    }

    #[test]
    fn test_accepts_shop_handles() {
        for name in ["shopper", "bob_99", "j.doe", "plum-fan", "_under", "abc", "a.b-c_d"] {
            assert!(UserName::new(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_keeps_typed_casing_but_compares_lowercase() {
        let name = UserName::new("  Ｓｈｏｐｐｅｒ_01 ").unwrap();
        assert_eq!(name.to_string(), "Shopper_01");
        assert_eq!(name.canonical(), "shopper_01");
        assert_eq!(UserName::from_db("Shopper_01").canonical(), name.canonical());
    }

    #[test]
    fn test_length_is_checked_after_trimming() {
        assert_eq!(rejected("   "), UserNameError::Empty);
        assert_eq!(rejected(" ab "), UserNameError::TooShort { length: 2, min: 3 });
        assert!(matches!(rejected(&"z".repeat(31)), UserNameError::TooLong { length: 31, .. }));
    }

    #[test]
    fn test_character_set() {
        assert_eq!(rejected("al ice"), UserNameError::InvalidCharacter { ch: ' ', position: 2 });
        assert!(matches!(rejected("bob+tag"), UserNameError::InvalidCharacter { ch: '+', .. }));
        assert!(matches!(rejected("買い物客"), UserNameError::InvalidCharacter { position: 0, .. }));
    }

    #[test]
    fn test_edges_and_dots() {
        assert_eq!(rejected(".plum"), UserNameError::InvalidBoundary);
        assert_eq!(rejected("plum-"), UserNameError::InvalidBoundary);
        assert_eq!(rejected("pl..um"), UserNameError::ConsecutiveDots);
    }

    #[test]
    fn test_reserved_words_unless_bootstrapping() {
        assert_eq!(rejected("Checkout"), UserNameError::Reserved("checkout".to_string()));
        assert!(UserName::new("checkout_fan").is_ok());
        assert!(UserName::new_with_reserved("admin", &[]).is_ok());
    }

    #[test]
    fn test_lookup_never_rejects() {
        assert_eq!(UserName::for_lookup(" Admin ").canonical(), "admin");
        assert_eq!(UserName::for_lookup("x").canonical(), "x");
    }

    #[test]
    fn test_error_points_at_user_name() {
        let err = AppError::from(UserNameError::Empty);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.param(), Some("userName"));
    }

    #[test]
    fn test_json_validates() {
        let name: UserName = serde_json::from_str("\"Carol\"").unwrap();
        assert_eq!(name.canonical(), "carol");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Carol\"");
        assert!(serde_json::from_str::<UserName>("\"me\"").is_err());
    }
}
