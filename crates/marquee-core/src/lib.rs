//! Core types for the Marquee advertising marketplace ledger.
//!
//! This crate provides the domain types shared by the storage and service
//! layers:
//!
//! - **Identifiers**: `UserId`, `EntryId`, `PayoutRequestId`
//! - **Accounts**: `Account`, `AccountKind`
//! - **Ledger**: `LedgerEntry`, `EntryKind`, `EntryStatus`
//! - **Payouts**: `PayoutRequest`, `PayoutStatus`, `PayoutMethod`
//!
//! # Money
//!
//! All amounts are integer **minor units** (cents), stored as `i64`.
//! A $50.00 deposit is `5000`. Floating-point arithmetic never touches a
//! balance; formatting to dollars happens only at the API edge.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod ids;
pub mod ledger;
pub mod payout;

pub use account::{Account, AccountKind};
pub use ids::{EntryId, IdError, PayoutRequestId, UserId};
pub use ledger::{EntryKind, EntryStatus, LedgerEntry};
pub use payout::{PayoutMethod, PayoutRequest, PayoutStatus};
