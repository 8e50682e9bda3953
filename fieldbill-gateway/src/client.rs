//! The HTTPS client behind receipt reconciliation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{error::GatewayError, query::receipt_query, receipt::{Receipt, ReceiptsResponse}};

/// Connection settings for the remote gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the receipts resource, without a query string.
    pub base_url: String,

    /// Fields requested via `$select`.
    #[serde(default = "defaults::select_fields")]
    pub select_fields: Vec<String>,

    /// Page size requested via `$top`.
    #[serde(default = "defaults::top")]
    pub top: u32,

    /// How many times a query is attempted before its error is surfaced.
    #[serde(default = "defaults::attempts")]
    pub attempts: u32,

    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Base delay between attempts; attempt `n` waits `n * base` before
    /// retrying (linear backoff).
    #[serde(default = "defaults::retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// PEM bundle holding the client certificate and its private key. The
    /// gateway rejects unauthenticated connections.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_certificate_pem: Option<String>,
}

mod defaults {
    pub fn select_fields() -> Vec<String> {
        ["itemId", "receiptNumber", "status"]
            .map(str::to_string)
            .to_vec()
    }

    pub const fn top() -> u32 {
        100
    }

    pub const fn attempts() -> u32 {
        3
    }

    pub const fn timeout_secs() -> u64 {
        30
    }

    pub const fn retry_backoff_ms() -> u64 {
        250
    }
}

/// Anything that can answer "what receipts exist for these ticket numbers".
///
/// The reconciler depends on this seam rather than the concrete client so
/// tests can drive it without a network.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Fetch the receipts for a set of ticket numbers.
    ///
    /// # Errors
    /// Fails when the gateway cannot be reached or rejects the query after
    /// all retry attempts.
    async fn query_receipts(&self, ticket_numbers: &[String]) -> Result<Vec<Receipt>, GatewayError>;
}

pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Build the client, loading the client certificate when configured.
    ///
    /// # Errors
    /// Fails when the certificate PEM is malformed or the underlying client
    /// cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(pem) = &config.client_certificate_pem {
            let identity = reqwest::Identity::from_pem(pem.as_bytes())
                .map_err(|e| GatewayError::Certificate(e.to_string()))?;
            builder = builder.identity(identity);
        }

        let http = builder.build()?;
        Ok(Self { http, config })
    }

    /// Delay before re-attempting a transiently failed query.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.config.retry_backoff_ms * u64::from(attempt))
    }

    async fn execute(&self, query: &str) -> Result<Vec<Receipt>, GatewayError> {
        let url = format!("{}?{query}", self.config.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::RemoteRejected { status, body });
        }

        let parsed: ReceiptsResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::UnexpectedBody {
                message: e.to_string(),
                body,
            })?;
        Ok(parsed.receipts)
    }
}

#[async_trait]
impl ReceiptSource for GatewayClient {
    async fn query_receipts(&self, ticket_numbers: &[String]) -> Result<Vec<Receipt>, GatewayError> {
        if ticket_numbers.is_empty() {
            return Ok(Vec::new());
        }

        let fields: Vec<&str> = self.config.select_fields.iter().map(String::as_str).collect();
        let query = receipt_query(&fields, self.config.top, ticket_numbers);

        let mut attempt = 1;
        loop {
            match self.execute(&query).await {
                Ok(receipts) => {
                    debug!(
                        tickets = ticket_numbers.len(),
                        receipts = receipts.len(),
                        "Receipt query succeeded"
                    );
                    return Ok(receipts);
                }
                Err(e) if e.is_transient() && attempt < self.config.attempts => {
                    warn!(attempt, error = %e, "Receipt query failed, retrying");
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
