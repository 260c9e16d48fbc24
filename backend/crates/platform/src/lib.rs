//! Storefront platform
//!
//! HTTP-facing plumbing with no business rules of its own:
//! - Argon2id passwords with an optional pepper
//! - the refresh-token cookie and client address resolution
//! - fixed-window rate limiting as axum middleware
//! - response hardening headers
//! - image upload checks and free-text sanitization

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
pub mod sanitize;
pub mod security_headers;
pub mod upload;
