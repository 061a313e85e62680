use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::core::config::Settings;
use crate::domain::{StyleDeviationResult, WritingStyle};

/// Writing-style comparison collaborator. Only invoked when a baseline
/// exists for the student.
#[async_trait]
pub trait StyleProfiler: Send + Sync {
    async fn compare(&self, content: &str, baseline: &WritingStyle)
        -> Result<StyleDeviationResult>;
}

#[derive(Debug, Clone)]
pub struct HttpStyleProfiler {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HttpStyleProfiler {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.style_profiler().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build style-profiler HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.style_profiler().api_key.clone(),
            base_url: settings.style_profiler().base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StyleProfiler for HttpStyleProfiler {
    async fn compare(
        &self,
        content: &str,
        baseline: &WritingStyle,
    ) -> Result<StyleDeviationResult> {
        let url = format!("{}/comparisons", self.base_url);
        let payload = json!({ "content": content, "baseline": baseline });

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call style profiler")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Style profiler error (status {status}): {body}"));
        }

        response.json::<StyleDeviationResult>().await.context("Failed to parse style deviation")
    }
}
