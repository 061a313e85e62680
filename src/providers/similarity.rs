use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::config::Settings;

/// Embedding/similarity collaborator used by collusion detection. Scores are
/// in [0, 1] and symmetric in their arguments.
#[async_trait]
pub trait SimilarityAnalyzer: Send + Sync {
    async fn content_similarity(&self, a: &str, b: &str) -> Result<f64>;

    async fn structural_similarity(&self, a: &str, b: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

#[derive(Debug, Clone)]
pub struct HttpSimilarityAnalyzer {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HttpSimilarityAnalyzer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.similarity().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build similarity HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.similarity().api_key.clone(),
            base_url: settings.similarity().base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn score(&self, endpoint: &str, a: &str, b: &str) -> Result<f64> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let payload = json!({ "text_a": a, "text_b": b });

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call similarity analyzer")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Similarity analyzer error (status {status}): {body}"));
        }

        let parsed =
            response.json::<ScoreResponse>().await.context("Failed to parse similarity score")?;
        Ok(parsed.score.clamp(0.0, 1.0))
    }
}

#[async_trait]
impl SimilarityAnalyzer for HttpSimilarityAnalyzer {
    async fn content_similarity(&self, a: &str, b: &str) -> Result<f64> {
        self.score("similarity/content", a, b).await
    }

    async fn structural_similarity(&self, a: &str, b: &str) -> Result<f64> {
        self.score("similarity/structure", a, b).await
    }
}
