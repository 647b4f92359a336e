//! Admin payout processing and dashboard handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use marquee_core::{PayoutRequestId, PayoutStatus};
use marquee_store::{FinancialSummary, Store};

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::handlers::venue::PayoutResponse;
use crate::state::AppState;

/// Payout list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListPayoutsQuery {
    /// Filter by lifecycle state (default: pending).
    pub status: Option<PayoutStatus>,
}

/// Payout list response.
#[derive(Debug, Serialize)]
pub struct ListPayoutsResponse {
    /// Matching requests, newest first.
    pub payout_requests: Vec<PayoutResponse>,
}

/// List payout requests awaiting (or past) admin action.
pub async fn list_payouts(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Query(query): Query<ListPayoutsQuery>,
) -> Result<Json<ListPayoutsResponse>, ApiError> {
    let status = query.status.unwrap_or(PayoutStatus::Pending);
    let payout_requests = state
        .store
        .list_payouts_by_status(status)?
        .iter()
        .map(PayoutResponse::from)
        .collect();

    Ok(Json(ListPayoutsResponse { payout_requests }))
}

/// Process payout request body.
#[derive(Debug, Deserialize)]
pub struct ProcessPayoutRequest {
    /// External transfer reference (wire id, PayPal batch id, ...).
    pub transaction_id: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Execute a pending payout request.
///
/// The store re-validates the request state and the venue balance inside
/// the same atomic write that performs the debit, so a request can never
/// be half-applied or applied twice.
pub async fn process_payout(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<PayoutRequestId>,
    Json(body): Json<ProcessPayoutRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    if body.transaction_id.trim().is_empty() {
        return Err(ApiError::BadRequest("transaction_id required".into()));
    }

    let request = state.store.complete_payout(
        &id,
        auth.0.user_id,
        body.transaction_id.trim(),
        body.notes.as_deref(),
    )?;

    tracing::info!(
        request_id = %request.id,
        venue = %request.venue,
        amount_cents = request.amount_cents,
        processed_by = %auth.0.user_id,
        "payout processed"
    );

    Ok(Json(PayoutResponse::from(&request)))
}

/// Reject payout request body.
#[derive(Debug, Deserialize)]
pub struct RejectPayoutRequest {
    /// Why the request was declined.
    pub notes: String,
}

/// Reject a pending payout request. The venue balance is untouched.
pub async fn reject_payout(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<PayoutRequestId>,
    Json(body): Json<RejectPayoutRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    if body.notes.trim().is_empty() {
        return Err(ApiError::BadRequest("rejection notes required".into()));
    }

    let request = state
        .store
        .reject_payout(&id, auth.0.user_id, Some(body.notes.trim()))?;

    tracing::info!(
        request_id = %request.id,
        venue = %request.venue,
        processed_by = %auth.0.user_id,
        "payout rejected"
    );

    Ok(Json(PayoutResponse::from(&request)))
}

/// Dashboard response.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Marketplace-wide financial totals.
    pub stats: FinancialSummary,
}

/// Marketplace financial dashboard.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Result<Json<DashboardResponse>, ApiError> {
    let stats = state.store.financial_summary()?;
    Ok(Json(DashboardResponse { stats }))
}
