//! Error types for ledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed. The enclosing write batch was not
    /// committed, so no partial state remains.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity type that was looked up.
        entity: &'static str,
        /// The id that was not found.
        id: String,
    },

    /// The account balance does not cover the requested debit.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in cents.
        balance: i64,
        /// Required amount in cents.
        required: i64,
    },

    /// The external reference already has a succeeded entry for this
    /// account (idempotency guard).
    #[error("duplicate external reference: {reference}")]
    DuplicateReference {
        /// The reference that was replayed.
        reference: String,
    },

    /// The payout request is already in a terminal state.
    #[error("payout request already resolved: {id}")]
    AlreadyResolved {
        /// The request id.
        id: String,
    },

    /// The amount is not a positive number of cents.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),
}
