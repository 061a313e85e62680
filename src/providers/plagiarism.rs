use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::core::config::Settings;
use crate::domain::PlagiarismReport;

#[derive(Debug, Clone, Serialize)]
pub struct PlagiarismCheckRequest<'a> {
    pub submission_id: &'a str,
    pub student_id: &'a str,
    pub content: &'a str,
    pub content_type: &'a str,
    pub course_id: Option<&'a str>,
    pub assignment_id: Option<&'a str>,
}

/// Text-similarity search collaborator. One call per submission; the report
/// it returns is immutable thereafter.
#[async_trait]
pub trait PlagiarismMatcher: Send + Sync {
    async fn check(&self, request: PlagiarismCheckRequest<'_>) -> Result<PlagiarismReport>;
}

#[derive(Debug, Clone)]
pub struct HttpPlagiarismMatcher {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
}

impl HttpPlagiarismMatcher {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.plagiarism().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build plagiarism HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.plagiarism().api_key.clone(),
            base_url: settings.plagiarism().base_url.trim_end_matches('/').to_string(),
            max_retries: settings.plagiarism().max_retries,
        })
    }
}

#[async_trait]
impl PlagiarismMatcher for HttpPlagiarismMatcher {
    async fn check(&self, request: PlagiarismCheckRequest<'_>) -> Result<PlagiarismReport> {
        let url = format!("{}/plagiarism/checks", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let response = self
                .client
                .post(&url)
                .header("X-Api-Key", &self.api_key)
                .json(&request)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .json::<PlagiarismReport>()
                            .await
                            .context("Failed to parse plagiarism report");
                    }
                    let body = resp.text().await.unwrap_or_default();
                    last_error = Some(anyhow::anyhow!(
                        "Plagiarism matcher error (status {status}): {body}"
                    ));
                }
                Err(err) => {
                    last_error =
                        Some(anyhow::anyhow!(err).context("Failed to call plagiarism matcher"));
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt))).await;
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown plagiarism matcher error")))
    }
}
