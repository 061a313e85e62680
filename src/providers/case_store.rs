use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::core::config::Settings;
use crate::domain::{CreateViolationRequest, ViolationCase};

/// Persistence collaborator for violation cases. Creation is the engine's
/// only side effect beyond computation; a single attempt, no retry, so a
/// slow store cannot delay the check result twice.
#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn create_violation(&self, request: CreateViolationRequest) -> Result<ViolationCase>;
}

#[derive(Debug, Clone)]
pub struct HttpCaseStore {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HttpCaseStore {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.case_store().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build case-store HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.case_store().api_key.clone(),
            base_url: settings.case_store().base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CaseStore for HttpCaseStore {
    async fn create_violation(&self, request: CreateViolationRequest) -> Result<ViolationCase> {
        let url = format!("{}/violations", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call case store")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Case store error (status {status}): {body}"));
        }

        response.json::<ViolationCase>().await.context("Failed to parse violation case")
    }
}
