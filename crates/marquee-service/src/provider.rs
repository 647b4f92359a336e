//! Payment provider API client.
//!
//! The provider exposes a Stripe-compatible payment-intent API: the
//! service creates an intent carrying the advertiser's account id in its
//! metadata, the advertiser confirms it client-side, and the provider
//! reports the outcome through the signed webhook handled in
//! [`crate::handlers::webhooks`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use marquee_core::UserId;

/// Error type for payment provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider API returned an error.
    #[error("provider API error: {error_type} - {message}")]
    Api {
        /// Error type reported by the provider.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code, if any.
        code: Option<String>,
    },
}

/// A payment intent created with the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Provider-assigned intent id; becomes the deposit's external
    /// reference when the webhook confirms it.
    pub id: String,

    /// Client secret for browser-side confirmation.
    pub client_secret: Option<String>,

    /// Amount in cents.
    pub amount: i64,

    /// Intent status as reported by the provider.
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
    code: Option<String>,
}

/// Payment provider API client.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ProviderClient {
    /// Default provider API base URL.
    const BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Create a new client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: Self::BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (used against test doubles).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a payment intent for an advertiser deposit.
    ///
    /// The account id rides in the intent metadata so the webhook can
    /// route the confirmation back to the right ledger account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    pub async fn create_payment_intent(
        &self,
        account: &UserId,
        amount_cents: i64,
    ) -> Result<PaymentIntent, ProviderError> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[account_id]", account.to_string()),
        ];

        tracing::debug!(
            account = %account,
            amount_cents,
            "creating payment intent"
        );

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Fetch a payment intent by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects it.
    pub async fn get_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, ProviderError> {
        let response = self
            .client
            .get(format!(
                "{}/payment_intents/{}",
                self.base_url, payment_intent_id
            ))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ProviderErrorResponse, _> = response.json().await;

        match error_body {
            Ok(provider_error) => Err(ProviderError::Api {
                error_type: provider_error.error.error_type,
                message: provider_error.error.message,
                code: provider_error.error.code,
            }),
            Err(_) => Err(ProviderError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}
