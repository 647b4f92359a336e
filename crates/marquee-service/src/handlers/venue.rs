//! Venue earnings and payout request handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use marquee_core::{EntryKind, PayoutMethod, PayoutRequest, PayoutStatus};
use marquee_store::Store;

use crate::auth::VenueAuth;
use crate::error::ApiError;
use crate::handlers::advertiser::EntryResponse;
use crate::handlers::format_cents;
use crate::state::AppState;

/// Earnings list query parameters.
#[derive(Debug, Deserialize)]
pub struct EarningsQuery {
    /// Maximum number of entries to return (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Earnings response.
#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    /// Accrual entries, newest first.
    pub earnings: Vec<EntryResponse>,
    /// Whether there are more entries.
    pub has_more: bool,
    /// Lifetime accrued earnings in cents.
    pub total_earned_cents: i64,
    /// Current withdrawable balance in cents.
    pub balance_cents: i64,
}

/// List the venue's accrued earnings with lifetime totals.
pub async fn get_earnings(
    State(state): State<Arc<AppState>>,
    auth: VenueAuth,
    Query(query): Query<EarningsQuery>,
) -> Result<Json<EarningsResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.0.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    let limit = query.limit.min(100);
    let entries = state.store.list_entries(
        &auth.0.user_id,
        Some(EntryKind::CampaignAccrual),
        limit + 1,
        query.offset,
    )?;

    let has_more = entries.len() > limit;
    let earnings: Vec<_> = entries.iter().take(limit).map(EntryResponse::from).collect();
    let total_earned_cents = state.store.accrued_total(&auth.0.user_id)?;

    Ok(Json(EarningsResponse {
        earnings,
        has_more,
        total_earned_cents,
        balance_cents: account.balance_cents,
    }))
}

/// Payout request body.
#[derive(Debug, Deserialize)]
pub struct PayoutRequestBody {
    /// Amount to withdraw, in cents.
    pub amount_cents: i64,
    /// Payout channel.
    pub method: PayoutMethod,
    /// Opaque method-specific details.
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Payout request response.
#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    /// Request id.
    pub id: String,
    /// The venue account.
    pub venue: String,
    /// Requested amount in cents.
    pub amount_cents: i64,
    /// Amount formatted as dollars.
    pub amount_formatted: String,
    /// Lifecycle state.
    pub status: PayoutStatus,
    /// Payout channel.
    pub method: PayoutMethod,
    /// External transfer reference, set on completion.
    pub transaction_id: Option<String>,
    /// Admin notes.
    pub notes: Option<String>,
    /// When the request was resolved.
    pub processed_at: Option<String>,
    /// When the request was created.
    pub created_at: String,
}

impl From<&PayoutRequest> for PayoutResponse {
    fn from(request: &PayoutRequest) -> Self {
        Self {
            id: request.id.to_string(),
            venue: request.venue.to_string(),
            amount_cents: request.amount_cents,
            amount_formatted: format_cents(request.amount_cents),
            status: request.status,
            method: request.method,
            transaction_id: request.transaction_id.clone(),
            notes: request.notes.clone(),
            processed_at: request.processed_at.map(|t| t.to_rfc3339()),
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

/// Request a withdrawal of accrued balance.
///
/// The funds check here is a pre-check against the live balance, not a
/// hold: other payouts approved first can still starve this request. The
/// authoritative re-check happens inside the admin's processing
/// transaction.
pub async fn request_payout(
    State(state): State<Arc<AppState>>,
    auth: VenueAuth,
    Json(body): Json<PayoutRequestBody>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.0.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    let minimum = state.config.minimum_payout_cents;
    if body.amount_cents < minimum {
        return Err(ApiError::BelowMinimum {
            minimum,
            requested: body.amount_cents,
        });
    }

    if body.amount_cents > account.balance_cents {
        return Err(ApiError::InsufficientFunds {
            balance: account.balance_cents,
            required: body.amount_cents,
        });
    }

    let request = PayoutRequest::new(auth.0.user_id, body.amount_cents, body.method, body.details);
    state.store.put_payout_request(&request)?;

    tracing::info!(
        request_id = %request.id,
        venue = %request.venue,
        amount_cents = request.amount_cents,
        method = ?request.method,
        "payout requested"
    );

    Ok(Json(PayoutResponse::from(&request)))
}

/// Payout history response.
#[derive(Debug, Serialize)]
pub struct PayoutHistoryResponse {
    /// The venue's payout requests, newest first.
    pub payouts: Vec<PayoutResponse>,
}

/// List the venue's payout requests.
pub async fn payout_history(
    State(state): State<Arc<AppState>>,
    auth: VenueAuth,
) -> Result<Json<PayoutHistoryResponse>, ApiError> {
    state
        .store
        .get_account(&auth.0.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    let payouts = state
        .store
        .list_payouts_by_venue(&auth.0.user_id)?
        .iter()
        .map(PayoutResponse::from)
        .collect();

    Ok(Json(PayoutHistoryResponse { payouts }))
}
