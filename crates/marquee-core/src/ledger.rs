//! Ledger entry types.
//!
//! Every balance change is justified by exactly one ledger entry. Entries
//! are immutable once written; corrections are new offsetting entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntryId, UserId};

/// An immutable record of one balance-affecting event.
///
/// The invariant the whole ledger rests on: for every account, the sum of
/// the signed amounts of its *succeeded* entries equals the account's
/// stored balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry id (ULID, time-ordered).
    pub id: EntryId,

    /// The account whose balance this entry affects.
    pub account: UserId,

    /// Amount in cents. Positive = credit, negative = debit.
    pub amount_cents: i64,

    /// What kind of event produced this entry.
    pub kind: EntryKind,

    /// External reference used for deduplication: the payment provider's
    /// intent id for deposits, the admin transfer id for payouts, the
    /// billing reference for accruals.
    pub external_reference: Option<String>,

    /// Processing status of the entry.
    pub status: EntryStatus,

    /// Account balance after this entry was applied, in cents.
    pub balance_after_cents: i64,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a succeeded entry. The storage layer is the only writer of
    /// entries; it records them at the moment the balance change commits.
    #[must_use]
    pub fn succeeded(
        account: UserId,
        amount_cents: i64,
        kind: EntryKind,
        external_reference: Option<String>,
        balance_after_cents: i64,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            account,
            amount_cents,
            kind,
            external_reference,
            status: EntryStatus::Succeeded,
            balance_after_cents,
            created_at: Utc::now(),
        }
    }
}

/// The kind of event a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// An advertiser funded their balance via the payment provider.
    Deposit,

    /// A venue withdrawal executed by an admin.
    Payout,

    /// Billed campaign display time converted into venue earnings.
    CampaignAccrual,
}

impl EntryKind {
    /// Whether entries of this kind add funds to the account.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit | Self::CampaignAccrual)
    }

    /// Whether entries of this kind remove funds from the account.
    #[must_use]
    pub const fn is_debit(&self) -> bool {
        matches!(self, Self::Payout)
    }
}

/// Processing status of a ledger entry.
///
/// Only succeeded entries count towards an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Written but not yet confirmed.
    Pending,

    /// Applied to the balance.
    Succeeded,

    /// Rejected; excluded from the balance.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_entry_carries_fields() {
        let account = UserId::generate();
        let entry = LedgerEntry::succeeded(
            account,
            5000,
            EntryKind::Deposit,
            Some("pi_123".into()),
            5000,
        );

        assert_eq!(entry.account, account);
        assert_eq!(entry.amount_cents, 5000);
        assert_eq!(entry.status, EntryStatus::Succeeded);
        assert_eq!(entry.balance_after_cents, 5000);
        assert_eq!(entry.external_reference.as_deref(), Some("pi_123"));
    }

    #[test]
    fn kind_credit_debit_split() {
        assert!(EntryKind::Deposit.is_credit());
        assert!(EntryKind::CampaignAccrual.is_credit());
        assert!(!EntryKind::Payout.is_credit());

        assert!(EntryKind::Payout.is_debit());
        assert!(!EntryKind::Deposit.is_debit());
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntryKind::CampaignAccrual).unwrap(),
            "\"campaign_accrual\""
        );
    }
}
