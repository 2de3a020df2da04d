//! Claims Router

use crate::application::config::ClaimsConfig;
use crate::domain::notification::Notifier;
use crate::infra::notifier::TracingNotifier;
use crate::infra::postgres::PgClaimsRepository;
use crate::presentation::handlers::{self, ClaimsAppState, ClaimsStore};
use crate::presentation::middleware::resolve_actor;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the claims router with the PostgreSQL repository
pub fn claims_router(
    repo: PgClaimsRepository,
    notifier: TracingNotifier,
    config: ClaimsConfig,
) -> Router {
    claims_router_generic(repo, notifier, config)
}

/// Create a generic claims router for any repository and notifier
pub fn claims_router_generic<R, N>(repo: R, notifier: N, config: ClaimsConfig) -> Router
where
    R: ClaimsStore,
    N: Notifier + Sync + 'static,
{
    let state = ClaimsAppState {
        repo: Arc::new(repo),
        notifier: Arc::new(notifier),
        config: Arc::new(config),
    };

    Router::new()
        .route("/matches/lost/{id}", get(handlers::matches_for_lost::<R, N>))
        .route("/matches/found/{id}", get(handlers::matches_for_found::<R, N>))
        .route("/items/strength", post(handlers::analyze_strength))
        .route(
            "/items/templates/{category}",
            get(handlers::category_templates),
        )
        .route("/items/lost", get(handlers::list_lost_items::<R, N>))
        .route("/items/lost/{id}", get(handlers::get_lost_item::<R, N>))
        .route("/items/found/{id}", get(handlers::get_found_item::<R, N>))
        .route("/claims", post(handlers::create_claim::<R, N>))
        .route("/claims/{id}", get(handlers::get_claim::<R, N>))
        .route("/claims/{id}/verify", post(handlers::verify_claim::<R, N>))
        .route("/claims/{id}/otp", post(handlers::issue_otp::<R, N>))
        .route(
            "/claims/{id}/otp/confirm",
            post(handlers::confirm_otp::<R, N>),
        )
        .route("/trust/me", get(handlers::my_trust::<R, N>))
        .route("/trust/{user_id}", get(handlers::user_trust::<R, N>))
        .route("/reports/allowance", get(handlers::report_allowance::<R, N>))
        .route(
            "/admin/trust/events",
            post(handlers::record_trust_event::<R, N>),
        )
        .layer(middleware::from_fn(resolve_actor))
        .with_state(state)
}
