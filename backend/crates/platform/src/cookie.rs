//! `Set-Cookie` rendering and `Cookie` parsing
//!
//! Only what the refresh-token cookie needs; no cookie jar.

use std::fmt;

use axum::http::{HeaderMap, HeaderValue, header};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Name and attributes of one cookie
///
/// Setting and expiring must use the same attributes, otherwise browsers
/// treat the expiry as a different cookie and keep the old one.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: &'static str,
    pub path: &'static str,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age_secs: Option<i64>,
}

impl CookieConfig {
    /// HttpOnly, `SameSite=Strict`, sent only to `/api/auth`
    pub fn refresh_token(secure: bool, max_age_secs: i64) -> Self {
        Self {
            name: "refresh_token",
            path: "/api/auth",
            secure,
            http_only: true,
            same_site: SameSite::Strict,
            max_age_secs: Some(max_age_secs),
        }
    }

    pub fn build_set_cookie(&self, value: &str) -> String {
        SetCookie {
            config: self,
            value,
            max_age: self.max_age_secs,
        }
        .to_string()
    }

    pub fn build_delete_cookie(&self) -> String {
        SetCookie {
            config: self,
            value: "",
            max_age: Some(0),
        }
        .to_string()
    }

    /// `None` when `value` holds bytes a header cannot carry
    pub fn set_cookie_header(&self, value: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_set_cookie(value)).ok()
    }

    pub fn delete_cookie_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_delete_cookie()).ok()
    }
}

struct SetCookie<'a> {
    config: &'a CookieConfig,
    value: &'a str,
    max_age: Option<i64>,
}

impl fmt::Display for SetCookie<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.config;
        write!(f, "{}={}", c.name, self.value)?;
        if c.http_only {
            f.write_str("; HttpOnly")?;
        }
        if c.secure {
            f.write_str("; Secure")?;
        }
        write!(f, "; SameSite={}; Path={}", c.same_site, c.path)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        Ok(())
    }
}

/// First non-empty value of cookie `name` across all `Cookie` headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = CookieConfig::refresh_token(true, 604_800).build_set_cookie("tok");
        assert_eq!(
            cookie,
            "refresh_token=tok; HttpOnly; Secure; SameSite=Strict; Path=/api/auth; Max-Age=604800"
        );
    }

    #[test]
    fn test_expiry_matches_scope() {
        let cookie = CookieConfig::refresh_token(false, 604_800).build_delete_cookie();
        assert_eq!(
            cookie,
            "refresh_token=; HttpOnly; SameSite=Strict; Path=/api/auth; Max-Age=0"
        );
    }

    #[test]
    fn test_header_rejects_unsafe_value() {
        let config = CookieConfig::refresh_token(true, 60);
        assert!(config.set_cookie_header("ok.value").is_some());
        assert!(config.set_cookie_header("bad\nvalue").is_none());
    }

    #[test]
    fn test_extract_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; empty="));
        headers.append(header::COOKIE, HeaderValue::from_static("refresh_token=abc123"));

        assert_eq!(extract_cookie(&headers, "refresh_token").as_deref(), Some("abc123"));
        assert_eq!(extract_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(extract_cookie(&headers, "empty"), None);
        assert_eq!(extract_cookie(&headers, "cart"), None);
    }
}
