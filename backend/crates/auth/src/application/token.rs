//! Token Service
//!
//! Issues and verifies the HS256 access/refresh pair. Access and refresh
//! tokens are signed with different keys and carry different `typ` claims,
//! so neither can stand in for the other.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::{AuthConfig, MIN_SECRET_LEN};
use crate::domain::entity::user::User;
use crate::domain::value_object::{UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims shared by both token types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub typ: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

/// Freshly issued pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    /// Seconds until the access token expires
    pub access_expires_in: u64,
    pub refresh_token: String,
    pub refresh_jti: Uuid,
    pub refresh_expires_at: DateTime<Utc>,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

pub struct TokenService {
    access: Keys,
    refresh: Keys,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    issuer: String,
    validation: Validation,
}

impl TokenService {
    /// Build from config, rejecting short or shared keys
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        for (name, secret) in [
            ("access", &config.access_secret),
            ("refresh", &config.refresh_secret),
        ] {
            if secret.len() < MIN_SECRET_LEN {
                return Err(AuthError::Configuration(format!(
                    "JWT {name} secret must be at least {MIN_SECRET_LEN} bytes"
                )));
            }
        }
        if *config.access_secret == *config.refresh_secret {
            return Err(AuthError::Configuration(
                "JWT access and refresh secrets must differ".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            access: Keys::new(&config.access_secret),
            refresh: Keys::new(&config.refresh_secret),
            access_ttl_secs: config.access_ttl.as_secs() as i64,
            refresh_ttl_secs: config.refresh_ttl.as_secs() as i64,
            issuer: config.issuer.clone(),
            validation,
        })
    }

    /// Issue a new access + refresh pair for `user`
    pub fn issue_pair(&self, user: &User) -> AuthResult<TokenPair> {
        let now = Utc::now();
        let access = self.claims(user, TokenType::Access, now, self.access_ttl_secs);
        let refresh = self.claims(user, TokenType::Refresh, now, self.refresh_ttl_secs);

        let access_token = self.sign(&access, &self.access)?;
        let refresh_token = self.sign(&refresh, &self.refresh)?;
        let refresh_expires_at = DateTime::from_timestamp(refresh.exp, 0)
            .ok_or_else(|| AuthError::Internal("Refresh expiry out of range".to_string()))?;

        Ok(TokenPair {
            access_token,
            access_expires_in: self.access_ttl_secs.max(0) as u64,
            refresh_token,
            refresh_jti: refresh.jti,
            refresh_expires_at,
        })
    }

    pub fn decode_access(&self, token: &str) -> AuthResult<Claims> {
        self.verify(token, &self.access, TokenType::Access)
    }

    pub fn decode_refresh(&self, token: &str) -> AuthResult<Claims> {
        self.verify(token, &self.refresh, TokenType::Refresh)
    }

    fn claims(&self, user: &User, typ: TokenType, now: DateTime<Utc>, ttl_secs: i64) -> Claims {
        let iat = now.timestamp();
        Claims {
            sub: *user.user_id.as_uuid(),
            role: user.user_role,
            typ,
            jti: Uuid::new_v4(),
            iat,
            exp: iat + ttl_secs,
            iss: self.issuer.clone(),
        }
    }

    fn sign(&self, claims: &Claims, keys: &Keys) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))
    }

    fn verify(&self, token: &str, keys: &Keys, expected: TokenType) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &keys.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })?;

        if data.claims.typ != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}
