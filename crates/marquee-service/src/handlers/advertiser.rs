//! Advertiser balance, transaction history, and deposit handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use marquee_core::{EntryKind, EntryStatus, LedgerEntry};
use marquee_store::Store;

use crate::auth::AdvertiserAuth;
use crate::error::ApiError;
use crate::handlers::format_cents;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Balance in cents.
    pub balance_cents: i64,
    /// Balance formatted as dollars.
    pub balance_formatted: String,
    /// Lifetime funds paid in, in cents.
    pub total_spent_cents: i64,
}

/// Get the advertiser's current balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AdvertiserAuth,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.0.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    Ok(Json(BalanceResponse {
        balance_cents: account.balance_cents,
        balance_formatted: format_cents(account.balance_cents),
        total_spent_cents: account.total_spent_cents,
    }))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of entries to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Ledger entry response.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: String,
    /// Amount in cents (positive = credit, negative = debit).
    pub amount_cents: i64,
    /// Entry kind.
    pub kind: EntryKind,
    /// Entry status.
    pub status: EntryStatus,
    /// External reference, if any.
    pub external_reference: Option<String>,
    /// Balance after this entry.
    pub balance_after_cents: i64,
    /// Timestamp.
    pub created_at: String,
}

impl From<&LedgerEntry> for EntryResponse {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            amount_cents: entry.amount_cents,
            kind: entry.kind,
            status: entry.status,
            external_reference: entry.external_reference.clone(),
            balance_after_cents: entry.balance_after_cents,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Transaction history response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Entries (newest first).
    pub transactions: Vec<EntryResponse>,
    /// Whether there are more entries.
    pub has_more: bool,
}

/// List the advertiser's ledger history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AdvertiserAuth,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Verify the account exists before touching the ledger index
    state
        .store
        .get_account(&auth.0.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let entries = state
        .store
        .list_entries(&auth.0.user_id, None, limit + 1, query.offset)?;

    let has_more = entries.len() > limit;
    let transactions: Vec<_> = entries.iter().take(limit).map(EntryResponse::from).collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}

/// Deposit intent request.
#[derive(Debug, Deserialize)]
pub struct DepositIntentRequest {
    /// Amount to deposit, in cents.
    pub amount_cents: i64,
}

/// Deposit intent response.
#[derive(Debug, Serialize)]
pub struct DepositIntentResponse {
    /// Provider payment intent id.
    pub payment_intent_id: String,
    /// Client secret for browser-side confirmation.
    pub client_secret: Option<String>,
}

/// Create a payment-provider intent to fund the advertiser's balance.
///
/// The balance itself is only credited when the provider's webhook
/// confirms the payment succeeded.
pub async fn create_deposit_intent(
    State(state): State<Arc<AppState>>,
    auth: AdvertiserAuth,
    Json(body): Json<DepositIntentRequest>,
) -> Result<Json<DepositIntentResponse>, ApiError> {
    let minimum = state.config.minimum_deposit_cents;
    if body.amount_cents < minimum {
        return Err(ApiError::BadRequest(format!(
            "minimum deposit is {}",
            format_cents(minimum)
        )));
    }

    let provider = state
        .provider
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("payment provider not configured".into()))?;

    // Verify the account exists before creating anything provider-side
    state
        .store
        .get_account(&auth.0.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    let intent = provider
        .create_payment_intent(&auth.0.user_id, body.amount_cents)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to create payment intent");
            ApiError::ExternalService(format!("failed to create payment intent: {e}"))
        })?;

    tracing::info!(
        account = %auth.0.user_id,
        payment_intent_id = %intent.id,
        amount_cents = body.amount_cents,
        "payment intent created"
    );

    Ok(Json(DepositIntentResponse {
        payment_intent_id: intent.id,
        client_secret: intent.client_secret,
    }))
}
