//! Common test utilities for marquee integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use marquee_core::UserId;
use marquee_service::auth::{Claims, Role};
use marquee_service::crypto::hmac_sha256_hex;
use marquee_service::{create_router, AppState, ServiceConfig};
use marquee_store::RocksStore;

/// HS256 secret shared between the harness and the service under test.
pub const AUTH_SECRET: &str = "test-auth-secret";

/// Webhook signing secret configured into the service.
pub const WEBHOOK_SECRET: &str = "whsec_test";

/// Service API key for accrual ingestion.
pub const SERVICE_API_KEY: &str = "test-service-key";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test advertiser user.
    pub advertiser_id: UserId,
    /// A test venue user.
    pub venue_id: UserId,
    /// A test admin user.
    pub admin_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_secret: AUTH_SECRET.into(),
            service_api_key: Some(SERVICE_API_KEY.into()),
            provider_api_key: None,
            provider_webhook_secret: Some(WEBHOOK_SECRET.into()),
            minimum_payout_cents: 10_000,
            minimum_deposit_cents: 1_000,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            advertiser_id: UserId::generate(),
            venue_id: UserId::generate(),
            admin_id: UserId::generate(),
        }
    }

    /// Mint a bearer token for an arbitrary user and role.
    pub fn token_for(&self, user_id: UserId, role: Role) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: now + 3600,
            iat: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(AUTH_SECRET.as_bytes()),
        )
        .expect("Failed to sign token");
        format!("Bearer {token}")
    }

    /// Authorization header for the test advertiser.
    pub fn advertiser_auth(&self) -> String {
        self.token_for(self.advertiser_id, Role::Advertiser)
    }

    /// Authorization header for the test venue.
    pub fn venue_auth(&self) -> String {
        self.token_for(self.venue_id, Role::Venue)
    }

    /// Authorization header for the test admin.
    pub fn admin_auth(&self) -> String {
        self.token_for(self.admin_id, Role::Admin)
    }

    /// Register the test advertiser's account.
    pub async fn register_advertiser(&self) {
        self.server
            .post("/accounts")
            .add_header("authorization", self.advertiser_auth())
            .await
            .assert_status_ok();
    }

    /// Register the test venue's account.
    pub async fn register_venue(&self) {
        self.server
            .post("/accounts")
            .add_header("authorization", self.venue_auth())
            .await
            .assert_status_ok();
    }

    /// Accrue earnings to the test venue via the service endpoint.
    pub async fn accrue(&self, amount_cents: i64) {
        self.server
            .post("/earnings/accrue")
            .add_header("x-api-key", SERVICE_API_KEY)
            .json(&serde_json::json!({
                "venue_account_id": self.venue_id.to_string(),
                "campaign_location_id": "loc-1",
                "amount_cents": amount_cents
            }))
            .await
            .assert_status_ok();
    }

    /// Produce a valid `Pay-Signature` header value for a raw body.
    pub fn sign_webhook(&self, body: &str) -> String {
        let timestamp = chrono::Utc::now().timestamp();
        let digest = hmac_sha256_hex(WEBHOOK_SECRET, &format!("{timestamp}.{body}"));
        format!("t={timestamp},v1={digest}")
    }

    /// Build a `payment_intent.succeeded` webhook body for the test
    /// advertiser.
    pub fn deposit_event(&self, reference: &str, amount_cents: i64) -> String {
        serde_json::json!({
            "type": "payment_intent.succeeded",
            "id": format!("evt_{reference}"),
            "data": {
                "object": {
                    "id": reference,
                    "amount": amount_cents,
                    "metadata": { "account_id": self.advertiser_id.to_string() }
                }
            }
        })
        .to_string()
    }

    /// Current advertiser balance in cents, via the API.
    pub async fn advertiser_balance(&self) -> i64 {
        let response = self
            .server
            .get("/advertiser/balance")
            .add_header("authorization", self.advertiser_auth())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["balance_cents"].as_i64().unwrap()
    }

    /// Current venue balance in cents, via the earnings endpoint.
    pub async fn venue_balance(&self) -> i64 {
        let response = self
            .server
            .get("/venue/earnings")
            .add_header("authorization", self.venue_auth())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["balance_cents"].as_i64().unwrap()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
