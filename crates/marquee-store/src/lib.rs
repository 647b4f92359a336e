//! `RocksDB` storage layer for the Marquee ledger.
//!
//! This crate is the sole mutator of account balances. Every balance
//! change inserts a ledger entry and updates the cached balance in one
//! atomic write batch; concurrent writers on the same account are
//! serialized by a per-account lock.
//!
//! # Architecture
//!
//! Column families:
//!
//! - `accounts`: account records, keyed by owner `UserId`
//! - `entries`: ledger entries, keyed by `entry_id` (ULID)
//! - `entries_by_account`: index for account history listings
//! - `entry_refs`: external-reference index for deposit idempotency
//! - `payout_requests`: payout requests, keyed by request id
//! - `payouts_by_venue`: index for venue payout listings
//!
//! # Example
//!
//! ```no_run
//! use marquee_core::{Account, AccountKind, EntryKind, UserId};
//! use marquee_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/marquee-db").unwrap();
//!
//! let owner = UserId::generate();
//! store.put_account(&Account::new(owner, AccountKind::Advertiser)).unwrap();
//!
//! let entry = store
//!     .credit(&owner, 5000, EntryKind::Deposit, Some("pi_123"))
//!     .unwrap();
//! assert_eq!(entry.balance_after_cents, 5000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use marquee_core::{
    Account, EntryId, EntryKind, LedgerEntry, PayoutRequest, PayoutRequestId, PayoutStatus, UserId,
};
use serde::Serialize;

/// The storage trait defining all ledger operations.
///
/// Abstracting the backend keeps the service layer testable and keeps
/// every balance mutation behind the transactional API: no caller ever
/// writes an account row directly.
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert or update an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Get an account by owner id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, owner: &UserId) -> Result<Option<Account>>;

    /// Get the current balance of an account, in cents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn balance_of(&self, owner: &UserId) -> Result<i64>;

    /// Recompute the balance by replaying succeeded ledger entries.
    ///
    /// Used to audit the conservation invariant: the result must always
    /// equal the stored balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn recompute_balance(&self, owner: &UserId) -> Result<i64>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Add funds to an account: one new succeeded entry plus the balance
    /// update, committed atomically. Deposit credits to advertiser
    /// accounts also bump the lifetime spend counter.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount_cents` is not positive.
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::DuplicateReference` if `external_ref` already has an
    ///   entry for this account.
    fn credit(
        &self,
        owner: &UserId,
        amount_cents: i64,
        kind: EntryKind,
        external_ref: Option<&str>,
    ) -> Result<LedgerEntry>;

    /// Remove funds from an account, failing when the balance doesn't
    /// cover the amount. The funds check runs inside the per-account
    /// critical section, so two concurrent debits can never both spend
    /// the same cents.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount_cents` is not positive.
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::InsufficientFunds` if the balance is too low.
    fn debit(
        &self,
        owner: &UserId,
        amount_cents: i64,
        kind: EntryKind,
        external_ref: Option<&str>,
    ) -> Result<LedgerEntry>;

    /// Get a ledger entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_entry(&self, entry_id: &EntryId) -> Result<Option<LedgerEntry>>;

    /// List an account's entries, newest first, optionally filtered by
    /// kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_entries(
        &self,
        owner: &UserId,
        kind: Option<EntryKind>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>>;

    /// Look up the entry recorded for an external reference, if any.
    /// This is the deposit idempotency check.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_entry_by_reference(
        &self,
        owner: &UserId,
        reference: &str,
    ) -> Result<Option<LedgerEntry>>;

    /// Sum of succeeded campaign-accrual credits for an account, in cents.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn accrued_total(&self, owner: &UserId) -> Result<i64>;

    // =========================================================================
    // Payout Request Operations
    // =========================================================================

    /// Insert a payout request. This also maintains the venue index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_payout_request(&self, request: &PayoutRequest) -> Result<()>;

    /// Get a payout request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_payout_request(&self, request_id: &PayoutRequestId) -> Result<Option<PayoutRequest>>;

    /// List a venue's payout requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_payouts_by_venue(&self, venue: &UserId) -> Result<Vec<PayoutRequest>>;

    /// List payout requests in a given state, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_payouts_by_status(&self, status: PayoutStatus) -> Result<Vec<PayoutRequest>>;

    /// Execute a payout request: re-fetch it inside the venue's critical
    /// section, re-validate funds against the live balance, debit the
    /// account, and mark the request completed, all in one atomic write.
    /// If any step fails the request keeps its prior state and the balance
    /// is untouched.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request or account doesn't exist.
    /// - `StoreError::AlreadyResolved` if the request is terminal.
    /// - `StoreError::InsufficientFunds` if the balance dropped below the
    ///   requested amount since the request was made.
    fn complete_payout(
        &self,
        request_id: &PayoutRequestId,
        admin: UserId,
        transaction_id: &str,
        notes: Option<&str>,
    ) -> Result<PayoutRequest>;

    /// Reject a payout request. Never touches the ledger.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request doesn't exist.
    /// - `StoreError::AlreadyResolved` if the request is terminal.
    fn reject_payout(
        &self,
        request_id: &PayoutRequestId,
        admin: UserId,
        notes: Option<&str>,
    ) -> Result<PayoutRequest>;

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Marketplace-wide financial totals for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn financial_summary(&self) -> Result<FinancialSummary>;
}

/// Marketplace-wide totals, computed by scanning accounts and payout
/// requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialSummary {
    /// Number of advertiser accounts.
    pub advertisers: u64,

    /// Number of venue accounts.
    pub venues: u64,

    /// Lifetime advertiser deposits, in cents.
    pub total_deposited_cents: i64,

    /// Sum of venue balances (funds owed to venues), in cents.
    pub total_owed_cents: i64,

    /// Number of payout requests awaiting admin action.
    pub pending_payout_count: u64,

    /// Value of payout requests awaiting admin action, in cents.
    pub pending_payout_cents: i64,
}
