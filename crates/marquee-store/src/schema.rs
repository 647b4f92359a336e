//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary account records, keyed by the owner `UserId`.
    pub const ACCOUNTS: &str = "accounts";

    /// Ledger entries, keyed by `entry_id` (ULID).
    pub const ENTRIES: &str = "entries";

    /// Index: entries by account, keyed by `owner || entry_id`.
    /// Value is empty (index only).
    pub const ENTRIES_BY_ACCOUNT: &str = "entries_by_account";

    /// Idempotency index: external references, keyed by
    /// `owner || reference`. Value is the 16-byte entry id.
    pub const ENTRY_REFS: &str = "entry_refs";

    /// Payout requests, keyed by `request_id`.
    pub const PAYOUT_REQUESTS: &str = "payout_requests";

    /// Index: payout requests by venue, keyed by `venue || request_id`.
    /// Value is empty (index only).
    pub const PAYOUTS_BY_VENUE: &str = "payouts_by_venue";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::ENTRIES,
        cf::ENTRIES_BY_ACCOUNT,
        cf::ENTRY_REFS,
        cf::PAYOUT_REQUESTS,
        cf::PAYOUTS_BY_VENUE,
    ]
}
