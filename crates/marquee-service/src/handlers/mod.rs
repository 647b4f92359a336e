//! API handlers.

// Allow precision loss in handlers - formatted dollar amounts are well
// within f64 precision
#![allow(clippy::cast_precision_loss)]

pub mod accounts;
pub mod accrual;
pub mod admin;
pub mod advertiser;
pub mod health;
pub mod venue;
pub mod webhooks;

/// Format a cents amount as a dollar string for display fields.
#[must_use]
pub(crate) fn format_cents(cents: i64) -> String {
    format!("${:.2}", cents as f64 / 100.0)
}
