//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, accrual, admin, advertiser, health, venue, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /payment/webhook` - Provider webhooks (signature verification)
///
/// ## Accounts (bearer auth, any role)
/// - `POST /accounts` - Register the caller's account
/// - `GET /accounts/me` - Get the caller's account
///
/// ## Advertiser (bearer auth, advertiser role)
/// - `GET /advertiser/balance` - Current balance
/// - `GET /advertiser/transactions` - Ledger history
/// - `POST /advertiser/deposit-intent` - Start a deposit
///
/// ## Venue (bearer auth, venue role)
/// - `GET /venue/earnings` - Accrued earnings
/// - `POST /venue/payout/request` - Request a withdrawal
/// - `GET /venue/payout/history` - Past requests
///
/// ## Admin (bearer auth, admin role)
/// - `GET /admin/payouts` - List requests by status
/// - `POST /admin/payouts/:id/process` - Execute a request
/// - `POST /admin/payouts/:id/reject` - Decline a request
/// - `GET /admin/dashboard` - Financial summary
///
/// ## Service (API key)
/// - `POST /earnings/accrue` - Report billed campaign time
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/me", get(accounts::get_account))
        // Advertiser
        .route("/advertiser/balance", get(advertiser::get_balance))
        .route("/advertiser/transactions", get(advertiser::list_transactions))
        .route(
            "/advertiser/deposit-intent",
            post(advertiser::create_deposit_intent),
        )
        // Payment provider webhook
        .route("/payment/webhook", post(webhooks::payment_webhook))
        // Venue
        .route("/venue/earnings", get(venue::get_earnings))
        .route("/venue/payout/request", post(venue::request_payout))
        .route("/venue/payout/history", get(venue::payout_history))
        // Accrual ingestion (service auth)
        .route("/earnings/accrue", post(accrual::accrue_earnings))
        // Admin
        .route("/admin/payouts", get(admin::list_payouts))
        .route("/admin/payouts/:id/process", post(admin::process_payout))
        .route("/admin/payouts/:id/reject", post(admin::reject_payout))
        .route("/admin/dashboard", get(admin::dashboard))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
