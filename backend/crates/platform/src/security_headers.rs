//! Response hardening headers
//!
//! Adds a Content-Security-Policy and the usual browser hardening headers to
//! every response, unless the handler already set them.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;

/// API responses are JSON and uploaded images. Nothing should execute.
pub const DEFAULT_CSP: &str = "default-src 'self'; img-src 'self' data:; object-src 'none'; \
     frame-ancestors 'none'; base-uri 'self'; form-action 'self'";

const HSTS: &str = "max-age=31536000; includeSubDomains";

#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub content_security_policy: String,
    /// Only meaningful behind TLS
    pub strict_transport_security: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            content_security_policy: DEFAULT_CSP.to_string(),
            strict_transport_security: true,
        }
    }
}

impl SecurityHeadersConfig {
    pub fn development() -> Self {
        Self {
            strict_transport_security: false,
            ..Self::default()
        }
    }
}

fn set_if_absent<S>(router: Router<S>, name: HeaderName, value: HeaderValue) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(SetResponseHeaderLayer::if_not_present(name, value))
}

/// Wrap `router` with the hardening headers
pub fn apply<S>(router: Router<S>, config: &SecurityHeadersConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let csp = HeaderValue::from_str(&config.content_security_policy).unwrap_or_else(|_| {
        tracing::warn!("Configured Content-Security-Policy is not a valid header, using default");
        HeaderValue::from_static(DEFAULT_CSP)
    });

    let mut router = set_if_absent(router, header::CONTENT_SECURITY_POLICY, csp);
    router = set_if_absent(
        router,
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    router = set_if_absent(
        router,
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    );
    router = set_if_absent(
        router,
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    router = set_if_absent(
        router,
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    if config.strict_transport_security {
        router = set_if_absent(
            router,
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        );
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_headers_added() {
        let app = apply(
            Router::new().route("/", get(|| async { "ok" })),
            &SecurityHeadersConfig::default(),
        );

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_SECURITY_POLICY], DEFAULT_CSP);
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
    }

    #[tokio::test]
    async fn test_handler_header_wins_and_hsts_optional() {
        let app = apply(
            Router::new().route(
                "/",
                get(|| async { ([(header::X_FRAME_OPTIONS, "SAMEORIGIN")], "ok") }),
            ),
            &SecurityHeadersConfig::development(),
        );

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert!(!response.headers().contains_key(header::STRICT_TRANSPORT_SECURITY));
    }
}
