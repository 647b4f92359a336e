//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/marquee").
    pub data_dir: String,

    /// HS256 secret for bearer-token validation.
    pub auth_secret: String,

    /// Service API key for service-to-service auth (accrual ingestion).
    pub service_api_key: Option<String>,

    /// Payment provider API key (optional).
    pub provider_api_key: Option<String>,

    /// Payment provider webhook signing secret (optional).
    pub provider_webhook_secret: Option<String>,

    /// Minimum payout request amount in cents (default: 10000 = $100).
    pub minimum_payout_cents: i64,

    /// Minimum deposit amount in cents (default: 1000 = $10).
    pub minimum_deposit_cents: i64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Payment provider secrets file structure.
#[derive(Debug, Deserialize)]
struct ProviderSecrets {
    api_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load provider secrets from file first, then fall back to
        // env vars
        let (provider_api_key, provider_webhook_secret) = load_provider_secrets();

        let auth_secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| {
            tracing::warn!("AUTH_SECRET not set - using insecure development secret");
            "marquee-dev-secret".into()
        });

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/marquee".into()),
            auth_secret,
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            provider_api_key,
            provider_webhook_secret,
            minimum_payout_cents: std::env::var("MINIMUM_PAYOUT_CENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000), // $100
            minimum_deposit_cents: std::env::var("MINIMUM_DEPOSIT_CENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_000), // $10
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Load payment provider secrets from file or environment.
fn load_provider_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/provider.json",
        "marquee/.secrets/provider.json",
        "../.secrets/provider.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<ProviderSecrets>(path) {
            tracing::info!(path = %path, "Loaded payment provider secrets from file");
            return (Some(secrets.api_key), secrets.webhook_secret);
        }
    }

    tracing::debug!("provider secrets file not found, using environment variables");
    (
        std::env::var("PROVIDER_API_KEY").ok(),
        std::env::var("PROVIDER_WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/marquee".into(),
            auth_secret: "marquee-dev-secret".into(),
            service_api_key: None,
            provider_api_key: None,
            provider_webhook_secret: None,
            minimum_payout_cents: 10_000,
            minimum_deposit_cents: 1_000,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
