//! Payout flow integration tests: accrual, request validation, admin
//! processing, and the execution-time re-validation.

mod common;

use axum::http::StatusCode;
use common::{TestHarness, SERVICE_API_KEY};
use serde_json::json;

// ============================================================================
// Accrual ingestion
// ============================================================================

#[tokio::test]
async fn accrual_requires_service_key() {
    let harness = TestHarness::new();
    harness.register_venue().await;

    let body = json!({
        "venue_account_id": harness.venue_id.to_string(),
        "campaign_location_id": "loc-1",
        "amount_cents": 5000
    });

    harness
        .server
        .post("/earnings/accrue")
        .json(&body)
        .await
        .assert_status_unauthorized();

    harness
        .server
        .post("/earnings/accrue")
        .add_header("x-api-key", "wrong-key")
        .json(&body)
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn accrual_credits_venue() {
    let harness = TestHarness::new();
    harness.register_venue().await;

    let response = harness
        .server
        .post("/earnings/accrue")
        .add_header("x-api-key", SERVICE_API_KEY)
        .json(&json!({
            "venue_account_id": harness.venue_id.to_string(),
            "campaign_location_id": "loc-7",
            "amount_cents": 30_000
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance_cents"], 30_000);
    assert_eq!(body["entry"]["kind"], "campaign_accrual");

    assert_eq!(harness.venue_balance().await, 30_000);
}

#[tokio::test]
async fn accrual_with_reference_is_idempotent() {
    let harness = TestHarness::new();
    harness.register_venue().await;

    let body = json!({
        "venue_account_id": harness.venue_id.to_string(),
        "campaign_location_id": "loc-7",
        "amount_cents": 30_000,
        "reference": "bill-2026-08-wk1-loc-7"
    });

    for _ in 0..2 {
        harness
            .server
            .post("/earnings/accrue")
            .add_header("x-api-key", SERVICE_API_KEY)
            .json(&body)
            .await
            .assert_status_ok();
    }

    assert_eq!(harness.venue_balance().await, 30_000);
}

#[tokio::test]
async fn accrual_rejects_advertiser_accounts() {
    let harness = TestHarness::new();
    harness.register_advertiser().await;

    harness
        .server
        .post("/earnings/accrue")
        .add_header("x-api-key", SERVICE_API_KEY)
        .json(&json!({
            "venue_account_id": harness.advertiser_id.to_string(),
            "campaign_location_id": "loc-1",
            "amount_cents": 5000
        }))
        .await
        .assert_status_bad_request();
}

// ============================================================================
// Earnings view
// ============================================================================

#[tokio::test]
async fn earnings_totals_track_accruals_and_payouts() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(30_000).await;
    harness.accrue(20_000).await;

    let response = harness
        .server
        .get("/venue/earnings")
        .add_header("authorization", harness.venue_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_earned_cents"], 50_000);
    assert_eq!(body["balance_cents"], 50_000);
    assert_eq!(body["earnings"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Payout requests
// ============================================================================

#[tokio::test]
async fn payout_below_minimum_rejected() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let response = harness
        .server
        .post("/venue/payout/request")
        .add_header("authorization", harness.venue_auth())
        .json(&json!({
            "amount_cents": 9_999,
            "method": "bank_transfer"
        }))
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "below_minimum");
}

#[tokio::test]
async fn payout_over_balance_rejected() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(20_000).await;

    let response = harness
        .server
        .post("/venue/payout/request")
        .add_header("authorization", harness.venue_auth())
        .json(&json!({
            "amount_cents": 20_001,
            "method": "paypal",
            "details": {"email": "owner@example.com"}
        }))
        .await;
    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_funds");
}

#[tokio::test]
async fn payout_request_is_pending_and_listed() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let response = harness
        .server
        .post("/venue/payout/request")
        .add_header("authorization", harness.venue_auth())
        .json(&json!({
            "amount_cents": 20_000,
            "method": "bank_transfer",
            "details": {"routing": "021000021", "account": "123456"}
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "pending");

    // Creating the request does not move the balance
    assert_eq!(harness.venue_balance().await, 50_000);

    let response = harness
        .server
        .get("/venue/payout/history")
        .add_header("authorization", harness.venue_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["payouts"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Admin processing
// ============================================================================

/// Create a payout request and return its id.
async fn request_payout(harness: &TestHarness, amount_cents: i64) -> String {
    let response = harness
        .server
        .post("/venue/payout/request")
        .add_header("authorization", harness.venue_auth())
        .json(&json!({
            "amount_cents": amount_cents,
            "method": "bank_transfer"
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn process_payout_debits_venue() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let request_id = request_payout(&harness, 20_000).await;

    let response = harness
        .server
        .post(&format!("/admin/payouts/{request_id}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({
            "transaction_id": "wire-42",
            "notes": "weekly run"
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["transaction_id"], "wire-42");

    assert_eq!(harness.venue_balance().await, 30_000);
}

#[tokio::test]
async fn processing_twice_is_rejected() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let request_id = request_payout(&harness, 20_000).await;

    harness
        .server
        .post(&format!("/admin/payouts/{request_id}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": "wire-1"}))
        .await
        .assert_status_ok();

    // A completed request cannot be re-debited
    harness
        .server
        .post(&format!("/admin/payouts/{request_id}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": "wire-1"}))
        .await
        .assert_status_not_found();

    assert_eq!(harness.venue_balance().await, 30_000);
}

#[tokio::test]
async fn stale_request_fails_at_execution_time() {
    // Balance 500.00; both a 200.00 and a 400.00 request pass the
    // request-time check. Processing the 400.00 first leaves 100.00, so
    // the 200.00 request must fail its execution-time re-check and stay
    // pending.
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let small = request_payout(&harness, 20_000).await;
    let large = request_payout(&harness, 40_000).await;

    harness
        .server
        .post(&format!("/admin/payouts/{large}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": "wire-big"}))
        .await
        .assert_status_ok();
    assert_eq!(harness.venue_balance().await, 10_000);

    let response = harness
        .server
        .post(&format!("/admin/payouts/{small}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": "wire-small"}))
        .await;
    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["details"]["balance_cents"], 10_000);
    assert_eq!(body["error"]["details"]["required_cents"], 20_000);

    // The starved request is still pending and the balance is unchanged
    assert_eq!(harness.venue_balance().await, 10_000);
    let response = harness
        .server
        .get("/admin/payouts?status=pending")
        .add_header("authorization", harness.admin_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let pending = body["payout_requests"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], small);
}

#[tokio::test]
async fn reject_leaves_balance_untouched() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let request_id = request_payout(&harness, 20_000).await;

    let response = harness
        .server
        .post(&format!("/admin/payouts/{request_id}/reject"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"notes": "payout details failed verification"}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "rejected");

    assert_eq!(harness.venue_balance().await, 50_000);

    // Terminal: cannot be processed afterwards
    harness
        .server
        .post(&format!("/admin/payouts/{request_id}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": "wire-late"}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn reject_requires_notes() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let request_id = request_payout(&harness, 20_000).await;

    harness
        .server
        .post(&format!("/admin/payouts/{request_id}/reject"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"notes": "  "}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn process_requires_transaction_id() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let request_id = request_payout(&harness, 20_000).await;

    harness
        .server
        .post(&format!("/admin/payouts/{request_id}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": ""}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn venues_cannot_process_payouts() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let request_id = request_payout(&harness, 20_000).await;

    harness
        .server
        .post(&format!("/admin/payouts/{request_id}/process"))
        .add_header("authorization", harness.venue_auth())
        .json(&json!({"transaction_id": "wire-1"}))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_list_filters_by_status() {
    let harness = TestHarness::new();
    harness.register_venue().await;
    harness.accrue(50_000).await;

    let first = request_payout(&harness, 10_000).await;
    let _second = request_payout(&harness, 10_000).await;

    harness
        .server
        .post(&format!("/admin/payouts/{first}/process"))
        .add_header("authorization", harness.admin_auth())
        .json(&json!({"transaction_id": "wire-1"}))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .get("/admin/payouts?status=completed")
        .add_header("authorization", harness.admin_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let completed = body["payout_requests"].as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], first);

    // Default filter is pending
    let response = harness
        .server
        .get("/admin/payouts")
        .add_header("authorization", harness.admin_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["payout_requests"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn dashboard_reports_marketplace_totals() {
    let harness = TestHarness::new();
    harness.register_advertiser().await;
    harness.register_venue().await;
    harness.accrue(30_000).await;

    // Fund the advertiser through the webhook path
    let body = harness.deposit_event("pi_dash", 80_000);
    let signature = harness.sign_webhook(&body);
    harness
        .server
        .post("/payment/webhook")
        .add_header("pay-signature", signature)
        .text(body)
        .await
        .assert_status_ok();

    request_payout(&harness, 12_000).await;

    let response = harness
        .server
        .get("/admin/dashboard")
        .add_header("authorization", harness.admin_auth())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["advertisers"], 1);
    assert_eq!(body["stats"]["venues"], 1);
    assert_eq!(body["stats"]["total_deposited_cents"], 80_000);
    assert_eq!(body["stats"]["total_owed_cents"], 30_000);
    assert_eq!(body["stats"]["pending_payout_count"], 1);
    assert_eq!(body["stats"]["pending_payout_cents"], 12_000);
}
