use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{ExportError, MatchExporter};
use crate::domain::summary::MatchSummary;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs each summary as JSON to a fixed URL.
pub struct WebhookExporter {
    client: reqwest::Client,
    url: String,
}

impl WebhookExporter {
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::config("Failed to build export HTTP client", e))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MatchExporter for WebhookExporter {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn export(&self, summary: &MatchSummary) -> Result<(), ExportError> {
        let response = self.client.post(&self.url).json(summary).send().await?;
        let status = response.status();
        debug!(match_id = %summary.match_id, status = status.as_u16(), "Webhook answered");
        if status.is_success() {
            Ok(())
        } else {
            Err(ExportError::Status(status))
        }
    }
}
