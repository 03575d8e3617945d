use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    pub model: String,
    pub base_url: String,
    /// Bearer token for the hosted endpoint. There is deliberately no
    /// built-in fallback value; a missing token fails client construction.
    pub api_token: Option<String>,
}

impl HostedConfig {
    /// Full inference URL for the configured model
    pub fn get_url(&self) -> Result<String> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), self.model);

        // Validate the URL
        Url::parse(&url).map_err(|e| ExternalError::ConfigError(format!("Invalid URL: {}", e)))?;

        Ok(url)
    }
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            model: "meta-llama/Meta-Llama-3-8B".to_string(),
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            api_token: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    generated_text: String,
}

/// Client for a hosted text-generation endpoint (HuggingFace Inference API)
pub struct HostedClient {
    client: Client,
    config: HostedConfig,
    token: String,
}

impl HostedClient {
    /// Create a new client. Fails if no API token is configured.
    pub fn new(config: HostedConfig) -> Result<Self> {
        let token = config.api_token.clone().ok_or_else(|| {
            ExternalError::ConfigError(
                "no API token configured; set HF_API_TOKEN or add it to config.json".to_string(),
            )
        })?;

        Ok(Self {
            client: Client::new(),
            config,
            token,
        })
    }

    /// Forward a prompt to the hosted endpoint and return the completion,
    /// with the echoed prompt stripped off.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.config.get_url()?;
        debug!(model = %self.config.model, "calling hosted inference endpoint");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&InferenceRequest { inputs: prompt })
            .send()
            .await
            .map_err(|e| ExternalError::ConnectionError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExternalError::HostedApiError(e.to_string()))?;

        if !status.is_success() {
            return Err(
                ExternalError::HostedApiError(format!("status {}: {}", status, body)).into(),
            );
        }

        let generated = parse_generated_text(&body)?;
        Ok(strip_prompt_echo(prompt, &generated).to_string())
    }
}

/// Pull `generated_text` out of the endpoint's JSON array response
pub fn parse_generated_text(body: &str) -> Result<String> {
    let outputs: Vec<InferenceOutput> = serde_json::from_str(body)
        .map_err(|e| ExternalError::HostedApiError(format!("unexpected response: {}", e)))?;

    outputs
        .into_iter()
        .next()
        .map(|o| o.generated_text)
        .ok_or_else(|| ExternalError::HostedApiError("empty response".to_string()).into())
}

/// The hosted endpoint echoes the prompt at the start of the completion
pub fn strip_prompt_echo<'a>(prompt: &str, generated: &'a str) -> &'a str {
    generated
        .strip_prefix(prompt)
        .map(str::trim_start)
        .unwrap_or(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_generation() {
        let config = HostedConfig::default();
        assert_eq!(
            config.get_url().unwrap(),
            "https://api-inference.huggingface.co/models/meta-llama/Meta-Llama-3-8B"
        );

        // Trailing slash on the base is normalized
        let config = HostedConfig {
            base_url: "https://example.com/models/".to_string(),
            model: "some/model".to_string(),
            api_token: None,
        };
        assert_eq!(config.get_url().unwrap(), "https://example.com/models/some/model");
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let result = HostedClient::new(HostedConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_generated_text() {
        let body = r#"[{"generated_text": "What is ML? ML is machine learning."}]"#;
        assert_eq!(
            parse_generated_text(body).unwrap(),
            "What is ML? ML is machine learning."
        );
    }

    #[test]
    fn test_parse_generated_text_rejects_garbage() {
        assert!(parse_generated_text("not json").is_err());
        assert!(parse_generated_text("[]").is_err());
    }

    #[test]
    fn test_strip_prompt_echo() {
        assert_eq!(
            strip_prompt_echo("What is ML?", "What is ML? ML is machine learning."),
            "ML is machine learning."
        );
        // No echo: returned unchanged
        assert_eq!(
            strip_prompt_echo("What is ML?", "ML is machine learning."),
            "ML is machine learning."
        );
    }
}
