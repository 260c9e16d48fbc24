//! Rate Limiting Infrastructure
//!
//! Fixed-window request counting keyed by client IP and route scope, an
//! in-process [`MemoryRateLimitStore`] and the axum middleware that applies it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use kernel::error::app_error::AppError;

use crate::client::{ClientIpSource, extract_client_ip};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Stricter limits for credential endpoints (sign-in, sign-up)
    pub fn auth_default() -> Self {
        Self::new(10, 15 * 60)
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>>;
}

// ============================================================================
// In-process store
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counters held in a concurrent map
///
/// Counters live only in this process; several replicas each enforce their
/// own budget.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: DashMap<String, Window>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop windows older than `window`, returning how many were removed
    pub fn purge_expired(&self, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, entry| entry.started.elapsed() < window);
        before.saturating_sub(self.windows.len())
    }

    fn hit(&self, key: &str, config: &RateLimitConfig, now: Instant) -> RateLimitResult {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= config.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = config
            .window
            .saturating_sub(now.duration_since(entry.started));

        if entry.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        entry.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - entry.count,
            reset_after,
        }
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.hit(key, config, Instant::now()))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// State for the [`rate_limit`] middleware
pub struct RateLimiter<S> {
    store: Arc<S>,
    config: RateLimitConfig,
    scope: &'static str,
    ip_source: ClientIpSource,
}

impl<S> Clone for RateLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            scope: self.scope,
            ip_source: self.ip_source,
        }
    }
}

impl<S> RateLimiter<S> {
    /// `scope` separates budgets of limiters sharing one store ("global", "auth")
    pub fn new(
        store: Arc<S>,
        config: RateLimitConfig,
        scope: &'static str,
        ip_source: ClientIpSource,
    ) -> Self {
        Self {
            store,
            config,
            scope,
            ip_source,
        }
    }
}

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Count the request against the caller's window
///
/// Over-budget requests get 429 with `Retry-After`. Every response carries
/// `X-RateLimit-Limit` and `X-RateLimit-Remaining`. A failing store lets the
/// request through.
pub async fn rate_limit<S>(
    State(limiter): State<RateLimiter<S>>,
    request: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Sync + 'static,
{
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = extract_client_ip(request.headers(), peer, limiter.ip_source)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}:{}", limiter.scope, client);

    let result = match limiter
        .store
        .check_and_increment(&key, &limiter.config)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, scope = limiter.scope, "Rate limit store failed, allowing request");
            return next.run(request).await;
        }
    };

    let mut response = if result.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, scope = limiter.scope, "Rate limit exceeded");
        let retry_after = result.reset_after.as_secs().max(1);
        let mut response = AppError::too_many_requests("Too many requests")
            .with_action("Retry after the window resets")
            .into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        response
    };

    let headers = response.headers_mut();
    headers.insert(
        X_RATELIMIT_LIMIT,
        HeaderValue::from(limiter.config.max_requests),
    );
    headers.insert(
        X_RATELIMIT_REMAINING,
        HeaderValue::from(result.remaining),
    );
    response
}
