pub mod config;
pub mod datasource;
pub mod document;
pub mod external;
pub mod pipeline;
pub mod session;

pub use config::{ChunkingConfig, Config};
pub use datasource::{ArxivSource, LocalSource, PdfSource};
pub use external::{
    EmbeddingEngine, ExternalError, HostedClient, LLMEngine, ScoredChunk, VectorDB,
};
pub use pipeline::RagPipeline;
pub use session::{ChatMessage, DocumentIndex, Role, Session};
