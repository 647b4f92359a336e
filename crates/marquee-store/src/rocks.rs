//! `RocksDB` storage implementation.
//!
//! Atomicity comes from writing every row touched by an operation in a
//! single `WriteBatch`. Isolation comes from a per-account lock map: all
//! balance-mutating operations on one account run the read-check-write
//! sequence under that account's lock, so concurrent debits serialize and
//! the funds check always sees the committed balance. Operations on
//! different accounts never contend.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use marquee_core::{
    Account, AccountKind, EntryId, EntryKind, EntryStatus, LedgerEntry, PayoutRequest,
    PayoutRequestId, PayoutStatus, UserId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{FinancialSummary, Store};

/// RocksDB-backed ledger store.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Get (or create) the write lock for one account.
    fn account_lock(&self, owner: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(*owner).or_default().clone()
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Load the account or fail with `NotFound`.
    fn require_account(&self, owner: &UserId) -> Result<Account> {
        self.get_account(owner)?.ok_or_else(|| StoreError::NotFound {
            entity: "account",
            id: owner.to_string(),
        })
    }

    /// Walk the entry index for one account, newest first.
    fn collect_entry_ids(&self, owner: &UserId) -> Result<Vec<EntryId>> {
        let cf_index = self.cf(cf::ENTRIES_BY_ACCOUNT)?;
        let prefix = keys::account_entries_prefix(owner);

        let iter = self.db.iterator_cf(
            &cf_index,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // ULID ordering means forward iteration is oldest-first.
        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            ids.push(keys::extract_entry_id(&key));
        }

        ids.reverse();
        Ok(ids)
    }

    /// Append the rows of a balance mutation to a write batch: the updated
    /// account, the entry, its account index, and (for credits carrying a
    /// reference) the idempotency index.
    fn stage_entry(
        &self,
        batch: &mut WriteBatch,
        account: &Account,
        entry: &LedgerEntry,
        index_reference: bool,
    ) -> Result<()> {
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_entries = self.cf(cf::ENTRIES)?;
        let cf_index = self.cf(cf::ENTRIES_BY_ACCOUNT)?;

        batch.put_cf(
            &cf_accounts,
            keys::account_key(&account.owner),
            Self::serialize(account)?,
        );
        batch.put_cf(&cf_entries, keys::entry_key(&entry.id), Self::serialize(entry)?);
        batch.put_cf(
            &cf_index,
            keys::account_entry_key(&account.owner, &entry.id),
            [],
        );

        if index_reference {
            if let Some(reference) = &entry.external_reference {
                let cf_refs = self.cf(cf::ENTRY_REFS)?;
                batch.put_cf(
                    &cf_refs,
                    keys::entry_ref_key(&account.owner, reference),
                    entry.id.to_bytes(),
                );
            }
        }

        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn put_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.owner);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_account(&self, owner: &UserId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(owner);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn balance_of(&self, owner: &UserId) -> Result<i64> {
        Ok(self.require_account(owner)?.balance_cents)
    }

    fn recompute_balance(&self, owner: &UserId) -> Result<i64> {
        let mut total = 0i64;
        for id in self.collect_entry_ids(owner)? {
            if let Some(entry) = self.get_entry(&id)? {
                if entry.status == EntryStatus::Succeeded {
                    total += entry.amount_cents;
                }
            }
        }
        Ok(total)
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn credit(
        &self,
        owner: &UserId,
        amount_cents: i64,
        kind: EntryKind,
        external_ref: Option<&str>,
    ) -> Result<LedgerEntry> {
        if amount_cents <= 0 {
            return Err(StoreError::InvalidAmount(amount_cents));
        }

        let lock = self.account_lock(owner);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(reference) = external_ref {
            if self.find_entry_by_reference(owner, reference)?.is_some() {
                return Err(StoreError::DuplicateReference {
                    reference: reference.to_string(),
                });
            }
        }

        let mut account = self.require_account(owner)?;
        account.balance_cents += amount_cents;
        if kind == EntryKind::Deposit && account.kind == AccountKind::Advertiser {
            account.total_spent_cents += amount_cents;
        }
        account.version += 1;
        account.updated_at = chrono::Utc::now();

        let entry = LedgerEntry::succeeded(
            *owner,
            amount_cents,
            kind,
            external_ref.map(String::from),
            account.balance_cents,
        );

        let mut batch = WriteBatch::default();
        self.stage_entry(&mut batch, &account, &entry, true)?;
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(entry)
    }

    fn debit(
        &self,
        owner: &UserId,
        amount_cents: i64,
        kind: EntryKind,
        external_ref: Option<&str>,
    ) -> Result<LedgerEntry> {
        if amount_cents <= 0 {
            return Err(StoreError::InvalidAmount(amount_cents));
        }

        let lock = self.account_lock(owner);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut account = self.require_account(owner)?;
        if account.balance_cents < amount_cents {
            return Err(StoreError::InsufficientFunds {
                balance: account.balance_cents,
                required: amount_cents,
            });
        }

        account.balance_cents -= amount_cents;
        account.version += 1;
        account.updated_at = chrono::Utc::now();

        let entry = LedgerEntry::succeeded(
            *owner,
            -amount_cents,
            kind,
            external_ref.map(String::from),
            account.balance_cents,
        );

        let mut batch = WriteBatch::default();
        self.stage_entry(&mut batch, &account, &entry, false)?;
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(entry)
    }

    fn get_entry(&self, entry_id: &EntryId) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(cf::ENTRIES)?;
        let key = keys::entry_key(entry_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_entries(
        &self,
        owner: &UserId,
        kind: Option<EntryKind>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerEntry>> {
        let mut entries = Vec::new();
        let mut skipped = 0;

        for id in self.collect_entry_ids(owner)? {
            if entries.len() >= limit {
                break;
            }

            let Some(entry) = self.get_entry(&id)? else {
                continue;
            };
            if kind.is_some_and(|k| entry.kind != k) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }

            entries.push(entry);
        }

        Ok(entries)
    }

    fn find_entry_by_reference(
        &self,
        owner: &UserId,
        reference: &str,
    ) -> Result<Option<LedgerEntry>> {
        let cf_refs = self.cf(cf::ENTRY_REFS)?;
        let key = keys::entry_ref_key(owner, reference);

        let Some(raw) = self
            .db
            .get_cf(&cf_refs, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let bytes: [u8; 16] = raw.as_slice().try_into().map_err(|_| {
            StoreError::Serialization("entry reference index holds malformed id".into())
        })?;
        let entry_id = EntryId::from_bytes(bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.get_entry(&entry_id)
    }

    fn accrued_total(&self, owner: &UserId) -> Result<i64> {
        let mut total = 0i64;
        for id in self.collect_entry_ids(owner)? {
            if let Some(entry) = self.get_entry(&id)? {
                if entry.status == EntryStatus::Succeeded
                    && entry.kind == EntryKind::CampaignAccrual
                {
                    total += entry.amount_cents;
                }
            }
        }
        Ok(total)
    }

    // =========================================================================
    // Payout Request Operations
    // =========================================================================

    fn put_payout_request(&self, request: &PayoutRequest) -> Result<()> {
        let cf_payouts = self.cf(cf::PAYOUT_REQUESTS)?;
        let cf_index = self.cf(cf::PAYOUTS_BY_VENUE)?;

        let value = Self::serialize(request)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_payouts, keys::payout_key(&request.id), &value);
        batch.put_cf(
            &cf_index,
            keys::venue_payout_key(&request.venue, &request.id),
            [],
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_payout_request(&self, request_id: &PayoutRequestId) -> Result<Option<PayoutRequest>> {
        let cf = self.cf(cf::PAYOUT_REQUESTS)?;
        let key = keys::payout_key(request_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_payouts_by_venue(&self, venue: &UserId) -> Result<Vec<PayoutRequest>> {
        let cf_index = self.cf(cf::PAYOUTS_BY_VENUE)?;
        let prefix = keys::venue_payouts_prefix(venue);

        let iter = self.db.iterator_cf(
            &cf_index,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut requests = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let request_id = keys::extract_payout_id(&key);
            if let Some(request) = self.get_payout_request(&request_id)? {
                requests.push(request);
            }
        }

        // Request ids are random UUIDs, so index order is arbitrary.
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    fn list_payouts_by_status(&self, status: PayoutStatus) -> Result<Vec<PayoutRequest>> {
        let cf_payouts = self.cf(cf::PAYOUT_REQUESTS)?;

        let mut requests = Vec::new();
        for item in self.db.iterator_cf(&cf_payouts, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let request: PayoutRequest = Self::deserialize(&value)?;
            if request.status == status {
                requests.push(request);
            }
        }

        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    fn complete_payout(
        &self,
        request_id: &PayoutRequestId,
        admin: UserId,
        transaction_id: &str,
        notes: Option<&str>,
    ) -> Result<PayoutRequest> {
        // First fetch only determines which account to lock.
        let venue = self
            .get_payout_request(request_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "payout request",
                id: request_id.to_string(),
            })?
            .venue;

        let lock = self.account_lock(&venue);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Re-fetch inside the critical section: a concurrent admin may
        // have resolved the request while we waited for the lock.
        let mut request = self
            .get_payout_request(request_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "payout request",
                id: request_id.to_string(),
            })?;
        if request.status.is_terminal() {
            return Err(StoreError::AlreadyResolved {
                id: request_id.to_string(),
            });
        }

        let mut account = self.require_account(&request.venue)?;
        if account.balance_cents < request.amount_cents {
            return Err(StoreError::InsufficientFunds {
                balance: account.balance_cents,
                required: request.amount_cents,
            });
        }

        let now = chrono::Utc::now();
        account.balance_cents -= request.amount_cents;
        account.version += 1;
        account.updated_at = now;

        let entry = LedgerEntry::succeeded(
            request.venue,
            -request.amount_cents,
            EntryKind::Payout,
            Some(transaction_id.to_string()),
            account.balance_cents,
        );

        request.complete(admin, transaction_id.to_string(), notes.map(String::from), now);

        let mut batch = WriteBatch::default();
        self.stage_entry(&mut batch, &account, &entry, false)?;
        let cf_payouts = self.cf(cf::PAYOUT_REQUESTS)?;
        batch.put_cf(
            &cf_payouts,
            keys::payout_key(&request.id),
            Self::serialize(&request)?,
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!(
            request_id = %request.id,
            venue = %request.venue,
            amount_cents = request.amount_cents,
            balance_cents = account.balance_cents,
            "payout completed"
        );

        Ok(request)
    }

    fn reject_payout(
        &self,
        request_id: &PayoutRequestId,
        admin: UserId,
        notes: Option<&str>,
    ) -> Result<PayoutRequest> {
        let venue = self
            .get_payout_request(request_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "payout request",
                id: request_id.to_string(),
            })?
            .venue;

        // Rejection mutates only the request row, but it still runs under
        // the venue lock so two admins cannot resolve the same request.
        let lock = self.account_lock(&venue);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut request = self
            .get_payout_request(request_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "payout request",
                id: request_id.to_string(),
            })?;
        if request.status.is_terminal() {
            return Err(StoreError::AlreadyResolved {
                id: request_id.to_string(),
            });
        }

        request.reject(admin, notes.map(String::from), chrono::Utc::now());

        let cf_payouts = self.cf(cf::PAYOUT_REQUESTS)?;
        self.db
            .put_cf(
                &cf_payouts,
                keys::payout_key(&request.id),
                Self::serialize(&request)?,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(request)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    fn financial_summary(&self) -> Result<FinancialSummary> {
        let mut summary = FinancialSummary::default();

        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        for item in self.db.iterator_cf(&cf_accounts, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let account: Account = Self::deserialize(&value)?;
            match account.kind {
                AccountKind::Advertiser => {
                    summary.advertisers += 1;
                    summary.total_deposited_cents += account.total_spent_cents;
                }
                AccountKind::Venue => {
                    summary.venues += 1;
                    summary.total_owed_cents += account.balance_cents;
                }
            }
        }

        let cf_payouts = self.cf(cf::PAYOUT_REQUESTS)?;
        for item in self.db.iterator_cf(&cf_payouts, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let request: PayoutRequest = Self::deserialize(&value)?;
            if request.status == PayoutStatus::Pending {
                summary.pending_payout_count += 1;
                summary.pending_payout_cents += request.amount_cents;
            }
        }

        Ok(summary)
    }
}
