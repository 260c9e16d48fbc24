//! Server configuration from environment variables
//!
//! Read once at startup. Anything malformed stops the server instead of
//! silently falling back.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::application::bootstrap_admin::BootstrapAdminInput;
use commerce::CommerceConfig;
use platform::client::ClientIpSource;
use platform::password::Pepper;
use platform::rate_limit::RateLimitConfig;
use platform::security_headers::SecurityHeadersConfig;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub commerce: CommerceConfig,
    pub rate_limit: RateLimitConfig,
    pub auth_rate_limit: RateLimitConfig,
    pub client_ip_source: ClientIpSource,
    pub security_headers: SecurityHeadersConfig,
    pub bootstrap_admin: Option<BootstrapAdminInput>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// `development` relaxes secrets and cookie flags
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        development: bool,
    ) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let auth = auth_config(&var, development)?;

        let mut commerce = CommerceConfig::default();
        if let Some(dir) = var("UPLOAD_DIR") {
            commerce.upload_dir = PathBuf::from(dir);
        }
        commerce.upload.max_bytes = parse_or(&var, "UPLOAD_MAX_BYTES", commerce.upload.max_bytes)?;

        let rate_limit = RateLimitConfig::new(
            parse_or(&var, "RATE_LIMIT_MAX", 100)?,
            parse_or(&var, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
        );
        let auth_defaults = RateLimitConfig::auth_default();
        let auth_rate_limit = RateLimitConfig::new(
            parse_or(&var, "AUTH_RATE_LIMIT_MAX", auth_defaults.max_requests)?,
            parse_or(
                &var,
                "AUTH_RATE_LIMIT_WINDOW_SECS",
                auth_defaults.window.as_secs(),
            )?,
        );

        let client_ip_source = if parse_or(&var, "TRUST_PROXY", false)? {
            ClientIpSource::XForwardedFor
        } else {
            ClientIpSource::Peer
        };

        let security_headers = if development {
            SecurityHeadersConfig::development()
        } else {
            SecurityHeadersConfig::default()
        };

        let bootstrap_admin = match (
            var("BOOTSTRAP_ADMIN_USER_NAME"),
            var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(user_name), Some(password)) => Some(BootstrapAdminInput {
                email: var("BOOTSTRAP_ADMIN_EMAIL")
                    .unwrap_or_else(|| format!("{user_name}@localhost.localdomain")),
                user_name,
                password,
            }),
            (None, None) => None,
            _ => bail!("BOOTSTRAP_ADMIN_USER_NAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr,
            frontend_origins,
            auth,
            commerce,
            rate_limit,
            auth_rate_limit,
            client_ip_source,
            security_headers,
            bootstrap_admin,
        })
    }

    /// Whole-request cap; the image route needs room for one upload
    pub fn request_body_limit(&self) -> usize {
        const MIN: usize = 1024 * 1024;
        self.commerce
            .upload
            .max_bytes
            .saturating_add(64 * 1024)
            .max(MIN)
    }
}

fn auth_config(
    var: &impl Fn(&str) -> Option<String>,
    development: bool,
) -> anyhow::Result<AuthConfig> {
    let mut config = match (var("JWT_ACCESS_SECRET"), var("JWT_REFRESH_SECRET")) {
        (Some(access), Some(refresh)) => AuthConfig {
            access_secret: Zeroizing::new(access.into_bytes()),
            refresh_secret: Zeroizing::new(refresh.into_bytes()),
            ..AuthConfig::default()
        },
        (None, None) if development => {
            tracing::warn!("JWT secrets not set, using random keys (tokens die with the process)");
            AuthConfig::development()
        }
        _ => bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must both be set"),
    };

    config.access_ttl = Duration::from_secs(parse_or(var, "JWT_ACCESS_TTL_SECS", 15 * 60)?);
    config.refresh_ttl = Duration::from_secs(parse_or(var, "JWT_REFRESH_TTL_SECS", 7 * 24 * 3600)?);
    config.cookie_secure = parse_or(var, "COOKIE_SECURE", !development)?;
    config.password_pepper = var("PASSWORD_PEPPER").map(Pepper::new);

    Ok(config)
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}
