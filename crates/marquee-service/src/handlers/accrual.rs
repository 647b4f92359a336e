//! Campaign earnings accrual ingestion.
//!
//! The billing process calls this endpoint whenever a campaign's
//! scheduled display time is billed. The amount arrives with commission
//! already deducted; the ledger is commission-agnostic.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use marquee_core::{AccountKind, EntryKind, UserId};
use marquee_store::{Store, StoreError};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::handlers::advertiser::EntryResponse;
use crate::state::AppState;

/// Accrual request body.
#[derive(Debug, Deserialize)]
pub struct AccrueRequest {
    /// The venue account to credit.
    pub venue_account_id: UserId,
    /// The billed campaign location, for audit context.
    pub campaign_location_id: String,
    /// Net amount to credit, in cents (commission already deducted).
    pub amount_cents: i64,
    /// Optional billing reference; when present, replays are deduplicated.
    pub reference: Option<String>,
}

/// Accrual response.
#[derive(Debug, Serialize)]
pub struct AccrueResponse {
    /// The recorded ledger entry.
    pub entry: EntryResponse,
    /// Venue balance after the accrual, in cents.
    pub balance_cents: i64,
}

/// Credit billed campaign display time to a venue account.
pub async fn accrue_earnings(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    Json(body): Json<AccrueRequest>,
) -> Result<Json<AccrueResponse>, ApiError> {
    if body.amount_cents <= 0 {
        return Err(ApiError::BadRequest(
            "amount_cents must be positive".into(),
        ));
    }

    let account = state
        .store
        .get_account(&body.venue_account_id)?
        .ok_or_else(|| ApiError::NotFound("venue account not found".into()))?;
    if account.kind != AccountKind::Venue {
        return Err(ApiError::BadRequest("account is not a venue".into()));
    }

    let entry = match state.store.credit(
        &body.venue_account_id,
        body.amount_cents,
        EntryKind::CampaignAccrual,
        body.reference.as_deref(),
    ) {
        Ok(entry) => entry,
        // A replayed billing reference returns the original entry; the
        // billing process may safely retry.
        Err(StoreError::DuplicateReference { reference }) => {
            tracing::info!(
                venue = %body.venue_account_id,
                reference = %reference,
                "duplicate accrual reference - returning original entry"
            );
            state
                .store
                .find_entry_by_reference(&body.venue_account_id, &reference)?
                .ok_or_else(|| {
                    ApiError::Internal("reference index points at missing entry".into())
                })?
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        service = %service.service_name,
        venue = %body.venue_account_id,
        campaign_location_id = %body.campaign_location_id,
        amount_cents = body.amount_cents,
        balance_cents = entry.balance_after_cents,
        "earnings accrued"
    );

    Ok(Json(AccrueResponse {
        balance_cents: entry.balance_after_cents,
        entry: EntryResponse::from(&entry),
    }))
}
