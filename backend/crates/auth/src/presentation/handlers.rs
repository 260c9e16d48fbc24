//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use kernel::error::app_error::AppError;
use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::application::{
    CurrentUserUseCase, RefreshUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase,
};
use crate::domain::repository::{AuthRepository, RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    RefreshRequest, SignInRequest, SignUpRequest, TokenResponse, UserResponse,
};
use crate::presentation::guard::{AnyUser, Authorized};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(AppError::from)?;

    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case
        .execute(SignUpInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(AppError::from)?;

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );
    let output = use_case
        .execute(SignInInput {
            identifier: req.identifier,
            password: req.password,
        })
        .await?;

    let cookie = refresh_cookie(&state.config, &output.tokens.refresh_token)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse::new(output.tokens, &output.user)),
    ))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
///
/// Token is read from the refresh cookie, falling back to `refreshToken`
/// in the JSON body for non-browser clients.
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    body: Bytes,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let token = presented_refresh_token(&state.config, &headers, &body)?
        .ok_or(AuthError::MissingToken)?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.tokens.clone());
    let output = use_case.execute(&token).await?;

    let cookie = refresh_cookie(&state.config, &output.tokens.refresh_token)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse::new(output.tokens, &output.user)),
    ))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    body: Bytes,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    if let Some(token) = presented_refresh_token(&state.config, &headers, &body)? {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.tokens.clone());
        use_case.execute(&token).await?;
    }

    // Clear the cookie even when nothing was presented
    let cookie = state
        .config
        .refresh_cookie()
        .delete_cookie_header()
        .ok_or_else(|| AuthError::Internal("Failed to build cookie header".to_string()))?;

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    caller: Authorized<AnyUser>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + AuthRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let use_case = CurrentUserUseCase::new(state.repo.clone());
    let user = use_case.execute(&caller.user_id).await?;

    Ok(Json(UserResponse::from(&user)))
}

// ============================================================================
// Helpers
// ============================================================================

fn refresh_cookie(config: &AuthConfig, token: &str) -> AuthResult<axum::http::HeaderValue> {
    config
        .refresh_cookie()
        .set_cookie_header(token)
        .ok_or_else(|| AuthError::Internal("Failed to build cookie header".to_string()))
}

/// Cookie first, then JSON body. An empty body is allowed.
fn presented_refresh_token(
    config: &AuthConfig,
    headers: &HeaderMap,
    body: &[u8],
) -> AuthResult<Option<String>> {
    let cookie_name = config.refresh_cookie().name;
    if let Some(token) = extract_cookie(headers, &cookie_name).filter(|t| !t.is_empty()) {
        return Ok(Some(token));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let req: RefreshRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {e}")))?;

    Ok(req.refresh_token.filter(|t| !t.is_empty()))
}
