use anyhow::Result;
use ollama_rs::{
    generation::{completion::request::GenerationRequest, options::GenerationOptions},
    Ollama,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::external::error::ExternalError;

/// How many alternative phrasings the multi-query retriever asks for.
const QUERY_VARIANTS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub host: String,
    pub port: u16,
    pub temperature: f32,
    pub top_p: f32,
}

impl LLMConfig {
    /// Get the full URL for the Ollama service
    pub fn get_url(&self) -> Result<String> {
        let url = if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        };

        // Validate the URL
        Url::parse(&url).map_err(|e| ExternalError::ConfigError(format!("Invalid URL: {}", e)))?;

        Ok(url)
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            // Grounded answers only, no sampling variety
            temperature: 0.0,
            top_p: 0.9,
        }
    }
}

/// Wrapper for the Ollama completion endpoint
pub struct LLMEngine {
    client: Ollama,
    config: LLMConfig,
}

impl LLMEngine {
    /// Create a new LLM engine with the given configuration
    pub async fn new(config: LLMConfig) -> Result<Self> {
        let url = config.get_url()?;
        let url = Url::parse(&url)
            .map_err(|e| ExternalError::ConfigError(format!("Invalid URL: {}", e)))?;

        let client = Ollama::new(
            url.host_str().unwrap_or("localhost").to_string(),
            config.port,
        );

        Ok(Self { client, config })
    }

    /// List the models available on the local Ollama runtime
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| ExternalError::OllamaError(e.to_string()))?;

        Ok(models.into_iter().map(|m| m.name).collect())
    }

    /// Generate text completion
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut request = GenerationRequest::new(self.config.model.clone(), prompt.to_string());

        let options = GenerationOptions::default()
            .temperature(self.config.temperature)
            .top_p(self.config.top_p);

        request.options = Some(options);

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| ExternalError::OllamaError(e.to_string()))?;

        Ok(response.response)
    }

    /// Rephrase the user question into several retrieval queries.
    ///
    /// The original question is always the first entry, so a model that
    /// ignores the instructions still leaves retrieval functional.
    pub async fn expand_query(&self, question: &str) -> Result<Vec<String>> {
        let response = self.generate(&query_expansion_prompt(question)).await?;
        let queries = parse_query_variants(question, &response);
        debug!(count = queries.len(), "expanded retrieval queries");
        Ok(queries)
    }
}

/// Prompt asking the model for alternative phrasings of a question
pub fn query_expansion_prompt(question: &str) -> String {
    format!(
        "You are an AI language model assistant. Your task is to generate {} \
        different versions of the given user question to retrieve relevant \
        documents from a vector database. By generating multiple perspectives \
        on the user question, your goal is to help the user overcome some of \
        the limitations of the distance-based similarity search. Provide these \
        alternative questions separated by newlines.\n\
        Original question: {}",
        QUERY_VARIANTS, question
    )
}

/// Prompt that restricts the answer to the retrieved context
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question based ONLY on the following context:\n\
        {}\n\
        Question: {}\n\
        If you don't know the answer, just say that you don't know, don't try \
        to make up an answer. Only provide the answer from the context, \
        nothing else. Add snippets of the context you used to answer the \
        question.",
        context, question
    )
}

/// Parse newline-separated question variants out of a model response.
///
/// Keeps the original question first, drops blank lines and duplicates,
/// and caps the variants at the requested count.
pub fn parse_query_variants(question: &str, response: &str) -> Vec<String> {
    let mut queries = vec![question.trim().to_string()];

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if queries.iter().any(|q| q == line) {
            continue;
        }
        queries.push(line.to_string());
        if queries.len() > QUERY_VARIANTS {
            break;
        }
    }

    queries
}
