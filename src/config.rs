use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::external::{EmbeddingConfig, HostedConfig, LLMConfig, VectorDBConfig};

/// Chunking parameters for document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 7500,
            overlap: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub llm: LLMConfig,
    pub vector_db: VectorDBConfig,
    pub hosted: HostedConfig,
    pub chunking: ChunkingConfig,
    pub log_level: String,
}

/// Optional on-disk credential file for the hosted endpoint
#[derive(Debug, Deserialize)]
struct CredentialFile {
    hf_api_token: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load embedding config
        let embedding = EmbeddingConfig {
            model: env::var("OLLAMA_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .unwrap_or_else(|_| "11434".to_string())
                .parse()
                .unwrap_or(11434),
        };

        // Load LLM config
        let llm = LLMConfig {
            model: env::var("OLLAMA_LLM_MODEL").unwrap_or_else(|_| "llama3".to_string()),
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .unwrap_or_else(|_| "11434".to_string())
                .parse()
                .unwrap_or(11434),
            temperature: env::var("OLLAMA_TEMPERATURE")
                .unwrap_or_else(|_| "0.0".to_string())
                .parse()
                .unwrap_or(0.0),
            top_p: env::var("OLLAMA_TOP_P")
                .unwrap_or_else(|_| "0.9".to_string())
                .parse()
                .unwrap_or(0.9),
        };

        // Load vector DB config
        let vector_db = VectorDBConfig {
            host: env::var("QDRANT_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("QDRANT_PORT")
                .unwrap_or_else(|_| "6334".to_string())
                .parse()
                .unwrap_or(6334),
            vector_size: env::var("QDRANT_VECTOR_SIZE")
                .unwrap_or_else(|_| "768".to_string())
                .parse()
                .unwrap_or(768),
        };

        // Load hosted inference config; the token never has a built-in default
        let hosted = HostedConfig {
            model: env::var("HF_MODEL")
                .unwrap_or_else(|_| "meta-llama/Meta-Llama-3-8B".to_string()),
            base_url: env::var("HF_BASE_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co/models".to_string()),
            api_token: load_hosted_token("config.json"),
        };

        // Load chunking config
        let chunking = ChunkingConfig {
            chunk_size: env::var("CHUNK_SIZE")
                .unwrap_or_else(|_| "7500".to_string())
                .parse()
                .unwrap_or(7500),
            overlap: env::var("CHUNK_OVERLAP")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            embedding,
            llm,
            vector_db,
            hosted,
            chunking,
            log_level,
        })
    }
}

/// Resolve the hosted-endpoint token: environment first, then an optional
/// credential file. Returns `None` when neither is present.
pub fn load_hosted_token<P: AsRef<Path>>(credential_file: P) -> Option<String> {
    if let Ok(token) = env::var("HF_API_TOKEN") {
        if !token.trim().is_empty() {
            return Some(token);
        }
    }

    let content = std::fs::read_to_string(credential_file).ok()?;
    let creds: CredentialFile = serde_json::from_str(&content).ok()?;
    Some(creds.hf_api_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopeguard::guard;
    use std::env;

    fn clean_env() {
        env::remove_var("OLLAMA_EMBEDDING_MODEL");
        env::remove_var("OLLAMA_LLM_MODEL");
        env::remove_var("OLLAMA_HOST");
        env::remove_var("OLLAMA_PORT");
        env::remove_var("OLLAMA_TEMPERATURE");
        env::remove_var("OLLAMA_TOP_P");
        env::remove_var("QDRANT_HOST");
        env::remove_var("QDRANT_PORT");
        env::remove_var("QDRANT_VECTOR_SIZE");
        env::remove_var("HF_MODEL");
        env::remove_var("HF_BASE_URL");
        env::remove_var("HF_API_TOKEN");
        env::remove_var("CHUNK_SIZE");
        env::remove_var("CHUNK_OVERLAP");
        env::remove_var("LOG_LEVEL");
    }

    #[test]
    #[serial_test::serial]
    fn test_default_config() {
        clean_env();
        let _guard = guard((), |_| clean_env());

        let config = Config::from_env().unwrap();

        // Check default values
        assert_eq!(
            config.embedding.model, "nomic-embed-text",
            "wrong default embedding model"
        );
        assert_eq!(config.llm.model, "llama3", "wrong default llm model");
        assert_eq!(config.llm.temperature, 0.0, "wrong default temperature");
        assert_eq!(config.vector_db.vector_size, 768, "wrong default vector size");
        assert_eq!(config.chunking.chunk_size, 7500, "wrong default chunk size");
        assert_eq!(config.chunking.overlap, 100, "wrong default overlap");
        assert_eq!(
            config.hosted.model, "meta-llama/Meta-Llama-3-8B",
            "wrong default hosted model"
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_custom_config() {
        clean_env();
        let _guard = guard((), |_| clean_env());

        // Set custom environment variables
        env::set_var("OLLAMA_EMBEDDING_MODEL", "custom-embed");
        env::set_var("OLLAMA_LLM_MODEL", "custom-llm");
        env::set_var("QDRANT_HOST", "qdrant.internal");
        env::set_var("CHUNK_SIZE", "2000");
        env::set_var("HF_MODEL", "custom/hosted-model");

        // Create config after setting environment variables
        let config = Config::from_env().unwrap();

        // Check custom values
        assert_eq!(
            config.embedding.model, "custom-embed",
            "embedding model mismatch"
        );
        assert_eq!(config.llm.model, "custom-llm", "llm model mismatch");
        assert_eq!(config.vector_db.host, "qdrant.internal", "qdrant host mismatch");
        assert_eq!(config.chunking.chunk_size, 2000, "chunk size mismatch");
        assert_eq!(
            config.hosted.model, "custom/hosted-model",
            "hosted model mismatch"
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_token_from_env() {
        clean_env();
        let _guard = guard((), |_| clean_env());

        env::set_var("HF_API_TOKEN", "hf_test_token");
        assert_eq!(
            load_hosted_token("does-not-exist.json"),
            Some("hf_test_token".to_string())
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_token_from_credential_file() {
        clean_env();
        let _guard = guard((), |_| clean_env());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"hf_api_token": "hf_file_token"}"#).unwrap();

        assert_eq!(load_hosted_token(&path), Some("hf_file_token".to_string()));
    }

    #[test]
    #[serial_test::serial]
    fn test_token_missing() {
        clean_env();
        let _guard = guard((), |_| clean_env());

        assert_eq!(load_hosted_token("does-not-exist.json"), None);
    }
}
