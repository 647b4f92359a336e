//! Authentication extractors.
//!
//! Role checks happen once here, at the boundary: handlers receive a
//! typed principal and never compare role strings themselves. Extractors:
//!
//! - `Principal` - any authenticated user (JWT)
//! - `AdvertiserAuth` / `VenueAuth` / `AdminAuth` - role-gated principals
//! - `ServiceAuth` - service-to-service authentication via API key

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use marquee_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Marketplace roles carried in the JWT `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Funds campaigns from a prepaid balance.
    Advertiser,

    /// Operates screens and withdraws accrued earnings.
    Venue,

    /// Moderates content and reconciles payouts.
    Admin,
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Marketplace role.
    pub role: Role,
    /// Expiration time (unix seconds).
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
}

/// A verified principal: who is calling, and in which role.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    /// The user ID from the `sub` claim.
    pub user_id: UserId,
    /// The verified role.
    pub role: Role,
}

/// Decode and validate the bearer token on a request.
fn authenticate(parts: &Parts, state: &AppState) -> Result<Principal, ApiError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let key = DecodingKey::from_secret(state.config.auth_secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default())
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id = data
        .claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Principal {
        user_id,
        role: data.claims.role,
    })
}

impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { authenticate(parts, state) })
    }
}

/// Macro to define a role-gated extractor wrapping `Principal`.
///
/// The wrapper authenticates the request and rejects with `Forbidden`
/// when the verified role does not match.
macro_rules! role_extractor {
    ($name:ident, $role:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub Principal);

        impl FromRequestParts<Arc<AppState>> for $name {
            type Rejection = ApiError;

            fn from_request_parts<'life0, 'life1, 'async_trait>(
                parts: &'life0 mut Parts,
                state: &'life1 Arc<AppState>,
            ) -> ::core::pin::Pin<
                Box<
                    dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                        + ::core::marker::Send
                        + 'async_trait,
                >,
            >
            where
                'life0: 'async_trait,
                'life1: 'async_trait,
                Self: 'async_trait,
            {
                Box::pin(async move {
                    let principal = authenticate(parts, state)?;
                    if principal.role != $role {
                        return Err(ApiError::Forbidden);
                    }
                    Ok(Self(principal))
                })
            }
        }
    };
}

role_extractor!(
    AdvertiserAuth,
    Role::Advertiser,
    "An authenticated advertiser principal."
);
role_extractor!(VenueAuth, Role::Venue, "An authenticated venue principal.");
role_extractor!(AdminAuth, Role::Admin, "An authenticated admin principal.");

/// Service authentication via API key.
///
/// Used for service-to-service requests (the billing process reporting
/// campaign accruals).
#[derive(Debug, Clone)]
pub struct ServiceAuth {
    /// The service name or identifier, if supplied.
    pub service_name: String,
}

impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let api_key = parts
                .headers
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            let expected_key = state
                .config
                .service_api_key
                .as_ref()
                .ok_or(ApiError::Unauthorized)?;

            if api_key != expected_key {
                return Err(ApiError::Unauthorized);
            }

            let service_name = parts
                .headers
                .get("x-service-name")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();

            Ok(ServiceAuth { service_name })
        })
    }
}
