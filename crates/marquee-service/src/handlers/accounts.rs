//! Account registration handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use marquee_core::{Account, AccountKind};
use marquee_store::Store;

use crate::auth::{Principal, Role};
use crate::error::ApiError;
use crate::handlers::format_cents;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Owning user id.
    pub owner: String,
    /// Advertiser or venue.
    pub kind: AccountKind,
    /// Current balance in cents.
    pub balance_cents: i64,
    /// Balance formatted as dollars.
    pub balance_formatted: String,
    /// Lifetime funds paid in, in cents (advertisers).
    pub total_spent_cents: i64,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            owner: account.owner.to_string(),
            kind: account.kind,
            balance_cents: account.balance_cents,
            balance_formatted: format_cents(account.balance_cents),
            total_spent_cents: account.total_spent_cents,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Register the caller's marketplace account. The account kind follows
/// the caller's role.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<AccountResponse>, ApiError> {
    let kind = match principal.role {
        Role::Advertiser => AccountKind::Advertiser,
        Role::Venue => AccountKind::Venue,
        Role::Admin => {
            return Err(ApiError::BadRequest(
                "admins do not hold marketplace accounts".into(),
            ))
        }
    };

    if state.store.get_account(&principal.user_id)?.is_some() {
        return Err(ApiError::Conflict("account already exists".into()));
    }

    let account = Account::new(principal.user_id, kind);
    state.store.put_account(&account)?;

    tracing::info!(owner = %account.owner, kind = ?account.kind, "account created");

    Ok(Json(AccountResponse::from(&account)))
}

/// Get the caller's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .store
        .get_account(&principal.user_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    Ok(Json(AccountResponse::from(&account)))
}
