//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! - protected routes: Auth validator → Rate limiter (per doctor) → Access logger
//! - open routes: Rate limiter (per peer address) → Access logger

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::AppConfig;

/// Build the API router with the default mailer and AI client.
pub fn api_router(config: AppConfig) -> Router {
    build_router(ApiContext::new(config))
}

/// Build router from a pre-constructed `ApiContext`.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/doctor", get(endpoints::doctor::profile))
        .route("/dashboard", get(endpoints::dashboard::overview))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/patients/:id/visits",
            get(endpoints::patients::visits).post(endpoints::patients::add_visit),
        )
        .route("/patients/:id/report", get(endpoints::reports::patient_report))
        .route("/patients/:id/summary", post(endpoints::summary::generate))
        .route(
            "/visits/:id",
            get(endpoints::visits::detail)
                .put(endpoints::visits::update)
                .delete(endpoints::visits::remove),
        )
        .route(
            "/visits/:id/follow-up/complete",
            post(endpoints::visits::complete_follow_up),
        )
        .route("/visits/:id/prescription", get(endpoints::reports::prescription))
        .with_state(ctx.clone())
        // innermost first, outermost last
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (rate-limited only)
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/auth/verify", post(endpoints::auth::verify))
        .route(
            "/auth/resend-verification",
            post(endpoints::auth::resend_verification),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", open.merge(protected))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
