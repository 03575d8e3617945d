mod embedding;
pub mod error;
mod hosted;
mod llm;
pub mod vectordb;

pub use embedding::{EmbeddingConfig, EmbeddingEngine};
pub use error::ExternalError;
pub use hosted::{HostedClient, HostedConfig};
pub use llm::{answer_prompt, LLMConfig, LLMEngine};
pub use vectordb::{merge_hits, ScoredChunk, VectorDB, VectorDBConfig};
