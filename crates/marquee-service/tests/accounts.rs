//! Account registration and authorization integration tests.

mod common;

use common::TestHarness;
use marquee_core::UserId;
use marquee_service::auth::Role;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_and_fetch_advertiser_account() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/accounts")
        .add_header("authorization", harness.advertiser_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "advertiser");
    assert_eq!(body["balance_cents"], 0);

    let response = harness
        .server
        .get("/accounts/me")
        .add_header("authorization", harness.advertiser_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["owner"], harness.advertiser_id.to_string());
}

#[tokio::test]
async fn register_venue_account() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/accounts")
        .add_header("authorization", harness.venue_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "venue");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let harness = TestHarness::new();
    harness.register_advertiser().await;

    let response = harness
        .server
        .post("/accounts")
        .add_header("authorization", harness.advertiser_auth())
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn admins_do_not_hold_accounts() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/accounts")
        .add_header("authorization", harness.admin_auth())
        .await;
    response.assert_status_bad_request();
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/advertiser/balance")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/advertiser/balance")
        .add_header("authorization", "Bearer not-a-jwt")
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    let harness = TestHarness::new();

    // A venue token cannot read advertiser balances
    harness
        .server
        .get("/advertiser/balance")
        .add_header("authorization", harness.venue_auth())
        .await
        .assert_status(axum::http::StatusCode::FORBIDDEN);

    // An advertiser token cannot list admin payouts
    harness
        .server
        .get("/admin/payouts")
        .add_header("authorization", harness.advertiser_auth())
        .await
        .assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tokens_are_not_transferable_across_secrets() {
    let harness = TestHarness::new();

    // Same claims, wrong signing key
    let forged = {
        use jsonwebtoken::{encode, EncodingKey, Header};
        let now = chrono::Utc::now().timestamp();
        let claims = marquee_service::auth::Claims {
            sub: UserId::generate().to_string(),
            role: Role::Admin,
            exp: now + 3600,
            iat: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"attacker-secret"),
        )
        .unwrap();
        format!("Bearer {token}")
    };

    harness
        .server
        .get("/admin/dashboard")
        .add_header("authorization", forged)
        .await
        .assert_status_unauthorized();
}

// ============================================================================
// Balance reads
// ============================================================================

#[tokio::test]
async fn balance_without_account_not_found() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/advertiser/balance")
        .add_header("authorization", harness.advertiser_auth())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn transactions_start_empty() {
    let harness = TestHarness::new();
    harness.register_advertiser().await;

    let response = harness
        .server
        .get("/advertiser/transactions")
        .add_header("authorization", harness.advertiser_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["transactions"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "marquee");
}
