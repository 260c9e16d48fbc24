//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth::application::BootstrapAdminUseCase;
use auth::{PgAuthRepository, TokenService, attach_principal, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
    middleware,
};
use commerce::{PgCommerceRepository, commerce_router};
use platform::rate_limit::{MemoryRateLimitStore, RateLimiter, rate_limit};
use platform::security_headers;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// How often stale rate-limit windows are dropped
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,commerce=info,listing=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired refresh tokens
    // Errors here should not prevent server startup
    let auth_repo = PgAuthRepository::new(pool.clone());
    if let Err(e) = auth_repo.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Refresh token cleanup failed, continuing anyway"
        );
    }

    let auth_config = Arc::new(config.auth.clone());
    let tokens = Arc::new(
        TokenService::new(&auth_config)
            .map_err(|e| anyhow::anyhow!("Invalid token configuration: {e}"))?,
    );

    if let Some(input) = config.bootstrap_admin.take() {
        BootstrapAdminUseCase::new(Arc::new(auth_repo.clone()), auth_config.clone())
            .execute(input)
            .await
            .map_err(|e| anyhow::anyhow!("Bootstrap admin failed: {e}"))?;
    }

    // Rate limiting: one store, separate budgets per scope
    let limit_store = Arc::new(MemoryRateLimitStore::new());
    let global_limiter = RateLimiter::new(
        limit_store.clone(),
        config.rate_limit.clone(),
        "global",
        config.client_ip_source,
    );
    let auth_limiter = RateLimiter::new(
        limit_store.clone(),
        config.auth_rate_limit.clone(),
        "auth",
        config.client_ip_source,
    );
    let longest_window = config.rate_limit.window.max(config.auth_rate_limit.window);
    tokio::spawn({
        let store = limit_store.clone();
        async move {
            let mut ticker = tokio::time::interval(RATE_LIMIT_PURGE_INTERVAL);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired(longest_window);
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired rate limit windows");
                }
            }
        }
    });

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let api = Router::new()
        .nest(
            "/auth",
            auth_router(auth_repo, tokens.clone(), auth_config, auth_limiter),
        )
        .merge(commerce_router(
            PgCommerceRepository::new(pool.clone()),
            config.commerce.clone(),
        ))
        .layer(middleware::from_fn_with_state(tokens, attach_principal));

    let app = Router::new()
        .nest("/api", api)
        .nest_service(
            &config.commerce.public_prefix,
            ServeDir::new(&config.commerce.upload_dir),
        )
        .layer(middleware::from_fn_with_state(
            global_limiter,
            rate_limit::<MemoryRateLimitStore>,
        ))
        .layer(RequestBodyLimitLayer::new(config.request_body_limit()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    let app = security_headers::apply(app, &config.security_headers);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
