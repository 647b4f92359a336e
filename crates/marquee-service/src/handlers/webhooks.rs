//! Payment provider webhook handler (the deposit processor).
//!
//! The provider delivers events at least once; duplicates and retries are
//! expected. The signature check runs before anything else, and a failed
//! check produces a 4xx with no side effect. Deduplication keys off the
//! payment intent id per account: a redelivered confirmation is
//! acknowledged without crediting again.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use marquee_core::{EntryKind, UserId};
use marquee_store::{Store, StoreError};

use crate::crypto;
use crate::error::ApiError;
use crate::state::AppState;

/// Accepted clock drift between the signed timestamp and now.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Provider webhook payload (simplified).
#[derive(Debug, Deserialize)]
pub struct ProviderWebhook {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event ID.
    pub id: String,
    /// Event data.
    pub data: ProviderEventData,
}

/// Provider event data container.
#[derive(Debug, Deserialize)]
pub struct ProviderEventData {
    /// Event object.
    pub object: serde_json::Value,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle payment provider webhooks.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    // Verify signature if a webhook secret is configured
    if let Some(secret) = &state.config.provider_webhook_secret {
        let signature = headers
            .get("pay-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("missing Pay-Signature header".into()))?;

        crypto::verify_signature(
            secret,
            signature,
            &body,
            chrono::Utc::now().timestamp(),
            SIGNATURE_TOLERANCE_SECS,
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "invalid webhook signature");
            ApiError::BadRequest("invalid webhook signature".into())
        })?;
    } else {
        // No webhook secret configured - skip verification (development mode)
        tracing::warn!("provider webhook secret not configured - skipping signature verification");
    }

    // Parse webhook payload
    let webhook: ProviderWebhook =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %webhook.event_type,
        event_id = %webhook.id,
        "received provider webhook"
    );

    match webhook.event_type.as_str() {
        "payment_intent.succeeded" => {
            handle_deposit_confirmed(&state, &webhook.data.object).await?;
        }
        "payment_intent.payment_failed" => {
            let intent_id = webhook
                .data
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            // The provider handles retries; nothing to record until a
            // payment actually succeeds.
            tracing::warn!(payment_intent_id = %intent_id, "payment failed");
        }
        _ => {
            tracing::debug!(event_type = %webhook.event_type, "unhandled provider event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Turn one verified payment confirmation into exactly one balance
/// credit.
async fn handle_deposit_confirmed(
    state: &AppState,
    object: &serde_json::Value,
) -> Result<(), ApiError> {
    let reference = object
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::BadRequest("missing payment intent id".into()))?;

    let amount_cents = object
        .get("amount")
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| ApiError::BadRequest("missing amount".into()))?;

    let account_str = object
        .get("metadata")
        .and_then(|m| m.get("account_id"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::BadRequest("missing metadata.account_id".into()))?;

    let owner = account_str
        .parse::<UserId>()
        .map_err(|_| ApiError::BadRequest(format!("invalid account_id: {account_str}")))?;

    // Idempotency: the provider redelivers webhooks, so a reference we
    // have already credited is acknowledged as success without touching
    // the ledger again.
    if state
        .store
        .find_entry_by_reference(&owner, reference)?
        .is_some()
    {
        tracing::info!(
            account = %owner,
            reference = %reference,
            "deposit already recorded - acknowledging redelivery"
        );
        return Ok(());
    }

    match state
        .store
        .credit(&owner, amount_cents, EntryKind::Deposit, Some(reference))
    {
        Ok(entry) => {
            tracing::info!(
                account = %owner,
                reference = %reference,
                amount_cents,
                balance_cents = entry.balance_after_cents,
                entry_id = %entry.id,
                "deposit credited"
            );
            Ok(())
        }
        // Lost the race against a concurrent delivery of the same event;
        // the credit landed exactly once either way.
        Err(StoreError::DuplicateReference { .. }) => {
            tracing::info!(
                account = %owner,
                reference = %reference,
                "concurrent redelivery - credit already recorded"
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
