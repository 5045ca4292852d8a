use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::ExtractError;
use crate::extract::semantic::SemanticExtractor;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Semantic extraction backend calling the OpenRouter API
pub struct OpenRouterExtractor {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenRouterExtractor {
    pub fn new(api_key: String, model: String) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ExtractError::Semantic(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Build the extractor from the OPENROUTER_API_KEY environment variable.
    /// A missing key is allowed; completions then return empty payloads so
    /// the pipeline can run offline.
    pub fn from_env(model: String) -> Result<Self, ExtractError> {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        Self::new(api_key, model)
    }

    async fn try_complete(&self, body: &Value) -> Result<String, ExtractError> {
        let res = self
            .client
            .post(OPENROUTER_URL)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ExtractError::Semantic(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let error_text = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ExtractError::Semantic(format!(
                "HTTP error {}: {}",
                status, error_text
            )));
        }

        let json: Value = res
            .json()
            .await
            .map_err(|e| ExtractError::Semantic(e.to_string()))?;

        if let Some(choice) = json["choices"].as_array().and_then(|arr| arr.first()) {
            if let Some(msg) = choice["message"]["content"].as_str() {
                return Ok(msg.to_string());
            }
        }

        if let Some(error) = json["error"].as_object() {
            if let Some(message) = error["message"].as_str() {
                return Err(ExtractError::Semantic(format!("API error: {}", message)));
            }
        }

        Err(ExtractError::Semantic(
            "Invalid response format from LLM API".to_string(),
        ))
    }
}

#[async_trait]
impl SemanticExtractor for OpenRouterExtractor {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractError> {
        if self.api_key.is_empty() {
            return Ok(r#"{"requirements": [], "conditions": [], "processes": []}"#.to_string());
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are an immigration policy analyst extracting structured data."},
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.2, // Lower temperature for more deterministic output
            "max_tokens": 1500
        });

        let max_retries = 3;
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!("LLM API call attempt {}/{}", attempt, max_retries);

            match self.try_complete(&body).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= max_retries {
                        return Err(ExtractError::Semantic(format!(
                            "Failed after {} attempts: {}",
                            max_retries, e
                        )));
                    }
                    // Exponential backoff
                    let backoff = Duration::from_millis(500 * 2u64.pow(attempt as u32 - 1));
                    tracing::warn!("LLM API call failed: {}. Retrying in {:?}...", e, backoff);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
