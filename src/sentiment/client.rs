use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::models::SentimentScores;

use super::SentimentClassifier;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the sentiment scoring service
#[derive(Debug, Clone)]
pub struct SentimentApiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl SentimentApiConfig {
    /// Read the endpoint from `SENTIMENT_API_URL` and an optional bearer
    /// token from `SENTIMENT_API_KEY`
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var("SENTIMENT_API_URL")
            .context("SENTIMENT_API_URL environment variable not set")?;
        let api_key = env::var("SENTIMENT_API_KEY").ok();
        Ok(Self {
            endpoint,
            api_key,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

/// HTTP client for the sentiment scoring service
pub struct HttpSentimentClassifier {
    client: reqwest::Client,
    config: SentimentApiConfig,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ScoreResponse {
    positive: f64,
    negative: f64,
    neutral: f64,
}

impl HttpSentimentClassifier {
    pub fn new(config: SentimentApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentScores> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&ScoreRequest { text });

        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("failed to reach sentiment service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("sentiment service error: {} - {}", status, body);
        }

        let scores: ScoreResponse = response
            .json()
            .await
            .context("malformed sentiment service response")?;

        Ok(SentimentScores {
            positive: scores.positive,
            negative: scores.negative,
            neutral: scores.neutral,
        })
    }
}
