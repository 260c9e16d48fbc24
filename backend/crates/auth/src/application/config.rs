//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::Pepper;
use zeroize::Zeroizing;

/// Minimum HS256 key length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 key for access tokens
    pub access_secret: Zeroizing<Vec<u8>>,
    /// HS256 key for refresh tokens (must differ from the access key)
    pub refresh_secret: Zeroizing<Vec<u8>>,
    /// Access token lifetime (15 minutes)
    pub access_ttl: Duration,
    /// Refresh token lifetime (1 week)
    pub refresh_ttl: Duration,
    /// `iss` claim written and required on every token
    pub issuer: String,
    /// Whether the refresh cookie carries `Secure`
    pub cookie_secure: bool,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Pepper>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: Zeroizing::new(Vec::new()),
            refresh_secret: Zeroizing::new(Vec::new()),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            issuer: "storefront".to_string(),
            cookie_secure: true,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Config with random signing keys (tokens die with the process)
    pub fn with_random_secret() -> Self {
        Self {
            access_secret: Zeroizing::new(platform::crypto::random_bytes(MIN_SECRET_LEN)),
            refresh_secret: Zeroizing::new(platform::crypto::random_bytes(MIN_SECRET_LEN)),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn pepper(&self) -> Option<&Pepper> {
        self.password_pepper.as_ref()
    }

    /// Cookie that carries the refresh token
    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig::refresh_token(self.cookie_secure, self.refresh_ttl.as_secs() as i64)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .field("cookie_secure", &self.cookie_secure)
            .field("password_pepper", &self.password_pepper)
            .finish()
    }
}
