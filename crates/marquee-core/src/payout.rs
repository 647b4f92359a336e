//! Payout request types.
//!
//! A venue asks to withdraw accrued earnings; an admin resolves the
//! request. Creating a request never touches the ledger; the debit
//! happens atomically with the transition to `Completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PayoutRequestId, UserId};

/// A venue-initiated, admin-resolved withdrawal of accrued balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutRequest {
    /// Unique request id.
    pub id: PayoutRequestId,

    /// The venue account to debit.
    pub venue: UserId,

    /// Requested amount in cents.
    pub amount_cents: i64,

    /// Current lifecycle state.
    pub status: PayoutStatus,

    /// How the venue wants to be paid.
    pub method: PayoutMethod,

    /// Opaque method-specific details (account numbers, emails, ...).
    pub details: serde_json::Value,

    /// Admin who resolved the request.
    pub processed_by: Option<UserId>,

    /// When the request was resolved.
    pub processed_at: Option<DateTime<Utc>>,

    /// External transfer reference entered by the admin on completion.
    pub transaction_id: Option<String>,

    /// Free-form admin notes.
    pub notes: Option<String>,

    /// When the venue created the request.
    pub created_at: DateTime<Utc>,
}

impl PayoutRequest {
    /// Create a new pending request.
    #[must_use]
    pub fn new(
        venue: UserId,
        amount_cents: i64,
        method: PayoutMethod,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: PayoutRequestId::generate(),
            venue,
            amount_cents,
            status: PayoutStatus::Pending,
            method,
            details,
            processed_by: None,
            processed_at: None,
            transaction_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the request completed with its audit trail.
    ///
    /// Callers must hold the request in a non-terminal state and perform
    /// the matching balance debit in the same atomic write.
    pub fn complete(
        &mut self,
        admin: UserId,
        transaction_id: String,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.status = PayoutStatus::Completed;
        self.processed_by = Some(admin);
        self.processed_at = Some(at);
        self.transaction_id = Some(transaction_id);
        self.notes = notes;
    }

    /// Mark the request rejected. Never touches the ledger.
    pub fn reject(&mut self, admin: UserId, notes: Option<String>, at: DateTime<Utc>) {
        self.status = PayoutStatus::Rejected;
        self.processed_by = Some(admin);
        self.processed_at = Some(at);
        self.notes = notes;
    }
}

/// Lifecycle state of a payout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Created by the venue, awaiting admin action.
    Pending,

    /// Flagged for processing but not yet executed.
    Approved,

    /// Executed; the venue balance was debited.
    Completed,

    /// Declined by an admin; no balance change.
    Rejected,
}

impl PayoutStatus {
    /// Whether this state is final. Terminal requests are never
    /// re-processed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

/// Supported payout channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    /// ACH / wire transfer.
    BankTransfer,

    /// PayPal transfer.
    Paypal,

    /// Mailed check.
    Check,
}
