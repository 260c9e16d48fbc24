//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use platform::rate_limit::{RateLimitStore, RateLimiter, rate_limit};

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::domain::repository::{AuthRepository, RefreshTokenRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
///
/// `/signup` and `/signin` sit behind `limiter`; token rotation and
/// `/me` only pass the global limit.
pub fn auth_router<S>(
    repo: PgAuthRepository,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
    limiter: RateLimiter<S>,
) -> Router
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        tokens,
        config,
    };

    credential_routes::<PgAuthRepository>()
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit::<S>))
        .merge(token_routes::<PgAuthRepository>())
        .with_state(state)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        tokens,
        config,
    };

    credential_routes::<R>()
        .merge(token_routes::<R>())
        .with_state(state)
}

fn credential_routes<R>() -> Router<AuthAppState<R>>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/signin", post(handlers::sign_in::<R>))
}

fn token_routes<R>() -> Router<AuthAppState<R>>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/me", get(handlers::me::<R>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::auth::Auth;
    use crate::infra::memory::MemoryAuthRepository;
    use crate::presentation::middleware::attach_principal;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        repo: MemoryAuthRepository,
    }

    fn harness() -> Harness {
        let config = Arc::new(AuthConfig::development());
        let tokens = Arc::new(TokenService::new(&config).unwrap());
        let repo = MemoryAuthRepository::new();

        let app = Router::new()
            .nest(
                "/api/auth",
                auth_router_generic(repo.clone(), tokens.clone(), config),
            )
            .layer(middleware::from_fn_with_state(tokens, attach_principal));

        Harness { app, repo }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, cookie, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn sign_up(app: &Router, name: &str) -> StatusCode {
        let (status, _, _) = send(
            app,
            post_json(
                "/api/auth/signup",
                json!({
                    "userName": name,
                    "email": format!("{name}@example.com"),
                    "password": "CorrectHorse9!",
                }),
            ),
        )
        .await;
        status
    }

    async fn sign_in(app: &Router, identifier: &str, password: &str) -> (StatusCode, Option<String>, Value) {
        send(
            app,
            post_json(
                "/api/auth/signin",
                json!({ "identifier": identifier, "password": password }),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let h = harness();
        assert_eq!(sign_up(&h.app, "alice").await, StatusCode::CREATED);

        let (status, cookie, body) = sign_in(&h.app, "alice", "CorrectHorse9!").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokenType"], "Bearer");
        assert_eq!(body["expiresIn"], 900);
        assert_eq!(body["user"]["role"], "customer");
        assert!(body["accessToken"].as_str().is_some());

        let cookie = cookie.unwrap();
        assert!(cookie.starts_with("refresh_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/api/auth"));

        // email works as identifier too, case-insensitively
        let (status, _, _) = sign_in(&h.app, "ALICE@example.com", "CorrectHorse9!").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sign_up_conflicts_and_validation() {
        let h = harness();
        assert_eq!(sign_up(&h.app, "bob").await, StatusCode::CREATED);
        assert_eq!(sign_up(&h.app, "BOB").await, StatusCode::CONFLICT);

        let (status, _, body) = send(
            &h.app,
            post_json(
                "/api/auth/signup",
                json!({ "userName": "carol", "email": "carol@example.com", "password": "short" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let (status, _, _) = send(
            &h.app,
            post_json(
                "/api/auth/signup",
                json!({
                    "userName": "dave",
                    "email": "dave@example.com",
                    "password": "CorrectHorse9!",
                    "role": "admin",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_password_and_lockout() {
        let h = harness();
        sign_up(&h.app, "erin").await;

        let (status, _, unknown) = sign_in(&h.app, "nobody", "CorrectHorse9!").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (_, _, wrong) = sign_in(&h.app, "erin", "WrongHorse9!").await;
        // same message for unknown user and wrong password
        assert_eq!(unknown["detail"], wrong["detail"]);

        for _ in 1..Auth::MAX_LOGIN_FAILURES {
            sign_in(&h.app, "erin", "WrongHorse9!").await;
        }

        let (status, _, _) = sign_in(&h.app, "erin", "CorrectHorse9!").await;
        assert_eq!(status, StatusCode::LOCKED);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let h = harness();
        let req = Request::builder()
            .uri("/api/auth/me")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        sign_up(&h.app, "frank").await;
        let (_, _, body) = sign_in(&h.app, "frank", "CorrectHorse9!").await;
        let access = body["accessToken"].as_str().unwrap();

        let req = Request::builder()
            .uri("/api/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userName"], "frank");
        assert_eq!(body["email"], "frank@example.com");
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_detects_reuse() {
        let h = harness();
        sign_up(&h.app, "grace").await;
        let (_, _, body) = sign_in(&h.app, "grace", "CorrectHorse9!").await;
        let first = body["refreshToken"].as_str().unwrap().to_string();
        let user_id = kernel::id::UserId::parse(body["user"]["userId"].as_str().unwrap()).unwrap();

        // rotate via cookie
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={first}"))
            .body(Body::empty())
            .unwrap();
        let (status, cookie, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::OK);
        let second = body["refreshToken"].as_str().unwrap().to_string();
        assert_ne!(first, second);
        assert!(cookie.unwrap().contains(&second));

        // replaying the first token revokes the whole family
        let (status, _, _) = send(
            &h.app,
            post_json("/api/auth/refresh", json!({ "refreshToken": first })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(
            h.repo
                .refresh_tokens_of(&user_id)
                .await
                .iter()
                .all(|t| t.is_revoked())
        );

        let (status, _, _) = send(
            &h.app,
            post_json("/api/auth/refresh", json!({ "refreshToken": second })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_without_token() {
        let h = harness();
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/refresh")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_out_revokes_and_clears_cookie() {
        let h = harness();
        sign_up(&h.app, "heidi").await;
        let (_, _, body) = sign_in(&h.app, "heidi", "CorrectHorse9!").await;
        let token = body["refreshToken"].as_str().unwrap().to_string();

        let (status, cookie, _) = send(
            &h.app,
            post_json("/api/auth/signout", json!({ "refreshToken": token })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(cookie.unwrap().contains("Max-Age=0"));

        let (status, _, _) = send(
            &h.app,
            post_json("/api/auth/refresh", json!({ "refreshToken": token })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // idempotent
        let (status, _, _) = send(
            &h.app,
            post_json("/api/auth/signout", json!({ "refreshToken": token })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
