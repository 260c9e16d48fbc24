//! Account password handling
//!
//! Argon2id with an optional server-side pepper. Clear text lives in
//! zeroizing wrappers and never shows up in `Debug` output.

use std::fmt;
use std::sync::OnceLock;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier};
use kernel::error::app_error::AppError;
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Counted in characters after NFKC normalization
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Exact matches, compared lowercase
const WEAK_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "abcdefgh", "letmein1", "welcome1",
    "admin123", "iloveyou", "sunshine", "princess", "football", "baseball",
    "trustno1", "shopping", "ecommerce", "checkout", "myshop123",
];

/// Substrings that make a password guessable wherever they appear
const KEYBOARD_RUNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

impl From<PasswordPolicyError> for AppError {
    fn from(err: PasswordPolicyError) -> Self {
        AppError::bad_request(err.to_string()).with_param("password")
    }
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

impl From<PasswordHashError> for AppError {
    fn from(err: PasswordHashError) -> Self {
        AppError::internal("Password processing failed").with_source(err)
    }
}

/// Server-side secret mixed into every password before hashing
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Pepper(Vec<u8>);

impl Pepper {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }
}

impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pepper([REDACTED])")
    }
}

/// A password as typed, NFKC-normalized; deliberately not `Clone`
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
/// let stored = password.hash(None).unwrap();
/// assert!(stored.verify(&password, None));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and apply the sign-up policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::for_verification(raw);
        check_policy(&password.0)?;
        Ok(password)
    }

    /// Normalize only; sign-in must still accept passwords set under an
    /// older, looser policy
    pub fn for_verification(raw: String) -> Self {
        let raw = Zeroizing::new(raw);
        Self(raw.nfkc().collect())
    }

    pub fn hash(&self, pepper: Option<&Pepper>) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(&self.with_pepper(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?
            .to_string();
        Ok(HashedPassword(phc))
    }

    fn with_pepper(&self, pepper: Option<&Pepper>) -> Zeroizing<Vec<u8>> {
        let mut input = Zeroizing::new(self.0.as_bytes().to_vec());
        if let Some(Pepper(secret)) = pepper {
            input.extend_from_slice(secret);
        }
        input
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClearTextPassword([REDACTED])")
    }
}

/// PHC string as stored in `auth_credentials.password_hash`
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn from_phc_string(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = phc.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self(phc))
    }

    pub fn as_phc_string(&self) -> &str {
        &self.0
    }

    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&Pepper>) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(&password.with_pepper(pepper), &parsed)
                .is_ok()
        })
    }

    /// Not Argon2id, or weaker parameters than the current defaults
    pub fn needs_rehash(&self) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }
        let current = Params::default();
        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() < current.m_cost()
                    || params.t_cost() < current.t_cost()
                    || params.p_cost() < current.p_cost()
            }
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([HASH])")
    }
}

/// Spend one Argon2 verification for a sign-in against an unknown account,
/// so timing does not reveal which identifiers exist
pub fn dummy_verify(password: &ClearTextPassword) {
    static DECOY: OnceLock<Option<HashedPassword>> = OnceLock::new();
    let decoy = DECOY.get_or_init(|| {
        ClearTextPassword::for_verification("decoy-password-for-timing".to_string())
            .hash(None)
            .ok()
    });
    if let Some(hash) = decoy {
        let _ = hash.verify(password, None);
    }
}

fn check_policy(password: &str) -> Result<(), PasswordPolicyError> {
    if password.trim().is_empty() {
        return Err(PasswordPolicyError::EmptyOrWhitespace);
    }

    let actual = password.chars().count();
    if actual < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual,
        });
    }
    if actual > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual,
        });
    }

    if password
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n'))
    {
        return Err(PasswordPolicyError::InvalidCharacter);
    }

    if is_guessable(&password.to_lowercase()) {
        return Err(PasswordPolicyError::CommonPattern);
    }
    Ok(())
}

fn is_guessable(lower: &str) -> bool {
    let single_char = lower
        .chars()
        .next()
        .is_some_and(|first| lower.chars().all(|c| c == first));

    single_char
        || is_digit_run(lower)
        || KEYBOARD_RUNS.iter().any(|run| lower.contains(run))
        || WEAK_PASSWORDS.contains(&lower)
}

/// "1234…" or "9876…", wrapping at 9/0
fn is_digit_run(s: &str) -> bool {
    let Some(digits) = s
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
    else {
        return false;
    };
    if digits.len() < 4 {
        return false;
    }
    let step_up = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let step_down = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    step_up || step_down
}
