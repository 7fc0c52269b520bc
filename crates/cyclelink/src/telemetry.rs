//! Upload sink for accepted location samples.
//!
//! Samples go out as single-row JSON inserts against a PostgREST-style
//! endpoint, one table per deployment. The tracker only ever talks to the
//! [`TelemetrySink`] trait so tests can swap the network out.

use async_trait::async_trait;
use cyclelink_lib::LocationSample;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("row insert rejected ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Destination for accepted samples. Implementations do not retry; a failed
/// insert is logged by the caller and superseded by the next fix.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn insert(&self, sample: &LocationSample) -> Result<(), TelemetryError>;
}

/// Row-insert client POSTing to `{base_url}/rest/v1/{table}`.
pub struct RowInsertClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl RowInsertClient {
    /// The client sets no request timeout; a stalled insert occupies only
    /// its own task, never the sample loop.
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        }
    }

    /// Full row-insert URL, useful for startup logging.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TelemetrySink for RowInsertClient {
    async fn insert(&self, sample: &LocationSample) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(&self.url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(sample)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<empty response>".to_string());
            return Err(TelemetryError::Status {
                status,
                body: body.trim().to_string(),
            });
        }

        Ok(())
    }
}
