//! Marquee HTTP API service.
//!
//! This crate provides the HTTP API for the marketplace ledger:
//!
//! - Account registration and balance queries
//! - Advertiser deposits via the payment-provider webhook
//! - Campaign earnings accrual (service-to-service)
//! - Venue payout requests and admin payout processing
//!
//! # Authentication
//!
//! The service supports three authentication methods:
//!
//! 1. **Bearer JWTs** (HS256) for end users; the role claim gates each
//!    route group via typed extractors
//! 2. **Service API keys** for the billing process reporting accruals
//! 3. **Webhook signatures** for the payment provider (no bearer token)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for the router

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use provider::{ProviderClient, ProviderError};
pub use routes::create_router;
pub use state::AppState;
