//! # codevault: Personal Code-Snippet Storage
//!
//! `codevault` is a small JSON HTTP service where registered users store, tag, search and share
//! code snippets. Each snippet belongs to one user and is either private or public; public
//! snippets can be browsed without an account.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for persistence. Requests flow through the usual layers:
//!
//! ```text
//! HTTP request
//!     -> tower-http (trace, CORS, optional Prometheus)
//!     -> extractors (JSON body, query, bearer token -> CurrentUser)
//!     -> handler (validation, ownership checks)
//!     -> repository (sqlx, one connection or transaction per request)
//!     -> PostgreSQL
//! ```
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes registration, login and password change under
//! `/api/auth/*`, the caller's profile under `/api/users/me`, and snippet storage under
//! `/api/snippets/*`. Request and response bodies use camelCase JSON.
//!
//! The **authentication layer** ([`auth`]) issues HS256 session tokens at login, verifies them on
//! every protected request, hashes passwords with Argon2id and decides who may read or modify a
//! snippet.
//!
//! The **database layer** ([`db`]) uses the repository pattern. Each entity has a repository over
//! a borrowed `PgConnection`, so handlers choose whether a unit of work runs in a transaction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use codevault::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = codevault::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     codevault::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run automatically on startup. They can also be run by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! codevault::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod tags;
pub mod telemetry;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

#[cfg(test)]
mod test;

use std::time::Duration;

use axum::{
    Router, http,
    http::HeaderValue,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{SnippetId, UserId};

use crate::openapi::ApiDoc;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the codevault database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect the pool and bring the schema up to date.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool_settings = &config.database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .min_connections(pool_settings.min_connections)
        .acquire_timeout(Duration::from_secs(pool_settings.acquire_timeout_secs))
        .connect_with(config.database.connect_options()?)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    // tower-http rejects `*` inside an explicit origin list
    let allow_origin = if config.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::PATCH])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (register, login, password change)
/// - Profile and snippet routes
/// - OpenAPI JSON and the Scalar docs page
/// - Optional Prometheus metrics
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration cannot be turned into header values.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/password-change", post(api::handlers::auth::change_password));

    let user_routes = Router::new().route(
        "/users/me",
        get(api::handlers::users::get_current_user).patch(api::handlers::users::update_current_user),
    );

    let snippet_routes = Router::new()
        .route(
            "/snippets",
            get(api::handlers::snippets::list_snippets).post(api::handlers::snippets::create_snippet),
        )
        .route("/snippets/public", get(api::handlers::snippets::list_public_snippets))
        .route(
            "/snippets/{id}",
            get(api::handlers::snippets::get_snippet)
                .patch(api::handlers::snippets::update_snippet)
                .put(api::handlers::snippets::update_snippet),
        )
        .route("/snippets/{id}/copy", post(api::handlers::snippets::copy_snippet));

    let api_routes = auth_routes.merge(user_routes).merge(snippet_routes).with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The HTTP application with its pool and router.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting codevault with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Build an application around an existing pool, skipping connection setup.
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;
        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "CodeVault listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
