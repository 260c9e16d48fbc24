//! Auth Middleware
//!
//! Resolves the `Authorization: Bearer` header into a [`Principal`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::token::TokenService;
use crate::error::AuthError;
use crate::presentation::guard::Principal;

/// Attach the caller's principal to the request
///
/// - no `Authorization` header: passes through anonymously
/// - malformed header or invalid/expired token: 401
/// - valid access token: inserts [`Principal`] into request extensions
///
/// Role checks happen later in the `Authorized` extractor.
pub async fn attach_principal(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Response {
    match bearer_token(req.headers()) {
        None => {}
        Some(None) => return AuthError::InvalidToken.into_response(),
        Some(Some(token)) => match tokens.decode_access(token) {
            Ok(claims) => {
                let principal = Principal {
                    user_id: claims.user_id(),
                    role: claims.role,
                };
                req.extensions_mut().insert(principal);
            }
            Err(e) => return e.into_response(),
        },
    }

    next.run(req).await
}

/// `None` when absent, `Some(None)` when present but not a bearer token
fn bearer_token(headers: &HeaderMap) -> Option<Option<&str>> {
    let value = headers.get(header::AUTHORIZATION)?;
    let token = value.to_str().ok().and_then(|v| {
        let (scheme, token) = v.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    });
    Some(token)
}
