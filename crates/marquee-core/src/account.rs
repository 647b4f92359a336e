//! Account types for the marketplace ledger.
//!
//! An account holds funds for one side of the marketplace: advertisers
//! prepay into their balance, venues accrue earnings that are later paid
//! out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// An advertiser account holding prepaid campaign funds.
    Advertiser,

    /// A venue account holding accrued, not-yet-paid-out earnings.
    Venue,
}

/// A balance-holding account for an advertiser or a venue.
///
/// The stored balance is derived state: it must always equal the sum of
/// the account's succeeded ledger entries. `version` increases on every
/// balance mutation and supports optimistic concurrency checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The owning user.
    pub owner: UserId,

    /// Advertiser or venue.
    pub kind: AccountKind,

    /// Current balance in cents. Never negative.
    pub balance_cents: i64,

    /// Lifetime funds an advertiser has paid into the platform, in cents.
    /// Stays zero for venue accounts.
    pub total_spent_cents: i64,

    /// Monotonically increasing mutation counter.
    pub version: u64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance.
    #[must_use]
    pub fn new(owner: UserId, kind: AccountKind) -> Self {
        let now = Utc::now();
        Self {
            owner,
            kind,
            balance_cents: 0,
            total_spent_cents: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the balance covers a debit of `amount_cents`.
    #[must_use]
    pub fn has_sufficient_funds(&self, amount_cents: i64) -> bool {
        self.balance_cents >= amount_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_empty() {
        let account = Account::new(UserId::generate(), AccountKind::Advertiser);
        assert_eq!(account.balance_cents, 0);
        assert_eq!(account.total_spent_cents, 0);
        assert_eq!(account.version, 0);
    }

    #[test]
    fn sufficient_funds_boundary() {
        let mut account = Account::new(UserId::generate(), AccountKind::Venue);
        account.balance_cents = 1000;

        assert!(account.has_sufficient_funds(999));
        assert!(account.has_sufficient_funds(1000));
        assert!(!account.has_sufficient_funds(1001));
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AccountKind::Advertiser).unwrap(),
            "\"advertiser\""
        );
        assert_eq!(
            serde_json::to_string(&AccountKind::Venue).unwrap(),
            "\"venue\""
        );
    }
}
