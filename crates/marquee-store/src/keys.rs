//! Key encoding utilities for `RocksDB`.
//!
//! Index keys concatenate the 16-byte owner id with the 16-byte record id.
//! Entry ids are ULIDs, so entry index keys sort chronologically within an
//! account prefix.

use marquee_core::{EntryId, PayoutRequestId, UserId};

/// Create an account key from an owner id.
#[must_use]
pub fn account_key(owner: &UserId) -> Vec<u8> {
    owner.as_bytes().to_vec()
}

/// Create a ledger entry key from an entry id.
#[must_use]
pub fn entry_key(entry_id: &EntryId) -> Vec<u8> {
    entry_id.to_bytes().to_vec()
}

/// Create an account-entry index key.
///
/// Format: `owner (16 bytes) || entry_id (16 bytes)`.
#[must_use]
pub fn account_entry_key(owner: &UserId, entry_id: &EntryId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(&entry_id.to_bytes());
    key
}

/// Create a prefix for iterating all entries of one account.
#[must_use]
pub fn account_entries_prefix(owner: &UserId) -> Vec<u8> {
    owner.as_bytes().to_vec()
}

/// Extract the entry id from an account-entry index key.
///
/// # Panics
///
/// Panics if the key is shorter than 32 bytes.
#[must_use]
pub fn extract_entry_id(key: &[u8]) -> EntryId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    EntryId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create an external-reference index key.
///
/// Format: `owner (16 bytes) || reference (utf-8)`. References are scoped
/// to one account: the same provider id for two different accounts is two
/// distinct keys.
#[must_use]
pub fn entry_ref_key(owner: &UserId, reference: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(16 + reference.len());
    key.extend_from_slice(owner.as_bytes());
    key.extend_from_slice(reference.as_bytes());
    key
}

/// Create a payout request key from a request id.
#[must_use]
pub fn payout_key(request_id: &PayoutRequestId) -> Vec<u8> {
    request_id.as_bytes().to_vec()
}

/// Create a venue-payout index key.
///
/// Format: `venue (16 bytes) || request_id (16 bytes)`.
#[must_use]
pub fn venue_payout_key(venue: &UserId, request_id: &PayoutRequestId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(venue.as_bytes());
    key.extend_from_slice(request_id.as_bytes());
    key
}

/// Create a prefix for iterating all payout requests of one venue.
#[must_use]
pub fn venue_payouts_prefix(venue: &UserId) -> Vec<u8> {
    venue.as_bytes().to_vec()
}

/// Extract the payout request id from a venue-payout index key.
///
/// # Panics
///
/// Panics if the key is shorter than 32 bytes.
#[must_use]
pub fn extract_payout_id(key: &[u8]) -> PayoutRequestId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    PayoutRequestId::from_uuid(uuid::Uuid::from_bytes(bytes))
}
