use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::core::config::Settings;
use crate::domain::{AiContentResult, WritingStyle};

/// Generative-text detection collaborator. Also owns the per-student
/// writing-style baseline store; the engine reads the baseline once before
/// fan-out and writes it once after aggregation, last-write-wins.
#[async_trait]
pub trait GenerativeTextDetector: Send + Sync {
    async fn detect(&self, content: &str, student_id: &str) -> Result<AiContentResult>;

    async fn get_baseline(&self, student_id: &str) -> Result<Option<WritingStyle>>;

    async fn update_baseline(&self, student_id: &str, content: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpGenerativeTextDetector {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
}

impl HttpGenerativeTextDetector {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.ai_detection().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build AI-detection HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai_detection().api_key.clone(),
            base_url: settings.ai_detection().base_url.trim_end_matches('/').to_string(),
            max_retries: settings.ai_detection().max_retries,
        })
    }
}

#[async_trait]
impl GenerativeTextDetector for HttpGenerativeTextDetector {
    async fn detect(&self, content: &str, student_id: &str) -> Result<AiContentResult> {
        let url = format!("{}/detections", self.base_url);
        let payload = json!({ "content": content, "student_id": student_id });
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let response =
                self.client.post(&url).bearer_auth(&self.api_key).json(&payload).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<AiContentResult>()
                            .await
                            .context("Failed to parse AI detection result");
                    }
                    let body = resp.text().await.unwrap_or_default();
                    last_error =
                        Some(anyhow::anyhow!("AI detector error (status {status}): {body}"));
                }
                Err(err) => {
                    last_error = Some(anyhow::anyhow!(err).context("Failed to call AI detector"));
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown AI detector error")))
    }

    async fn get_baseline(&self, student_id: &str) -> Result<Option<WritingStyle>> {
        let url = format!("{}/baselines/{}", self.base_url, student_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to call baseline endpoint")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Baseline lookup error (status {status}): {body}"));
        }

        let baseline =
            response.json::<WritingStyle>().await.context("Failed to parse writing baseline")?;
        Ok(Some(baseline))
    }

    async fn update_baseline(&self, student_id: &str, content: &str) -> Result<()> {
        let url = format!("{}/baselines/{}", self.base_url, student_id);
        let payload = json!({ "content": content });
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call baseline update endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Baseline update error (status {status}): {body}"));
        }

        Ok(())
    }
}
