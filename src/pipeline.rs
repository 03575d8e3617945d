use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::datasource::PdfSource;
use crate::document;
use crate::external::vectordb::{merge_hits, ScoredChunk};
use crate::external::{answer_prompt, EmbeddingEngine, LLMEngine, VectorDB};
use crate::session::DocumentIndex;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    async fn expand_query(&self, question: &str) -> Result<Vec<String>>;
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_collection(&self, collection: &str) -> Result<()>;
    async fn upsert_chunks(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        texts: Vec<String>,
    ) -> Result<usize>;
    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredChunk>>;
    async fn delete_collection(&self, collection: &str) -> Result<()>;
}

#[async_trait]
impl Embedder for EmbeddingEngine {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        EmbeddingEngine::embed(self, text).await
    }
}

#[async_trait]
impl Generator for LLMEngine {
    async fn generate(&self, prompt: &str) -> Result<String> {
        LLMEngine::generate(self, prompt).await
    }

    async fn expand_query(&self, question: &str) -> Result<Vec<String>> {
        LLMEngine::expand_query(self, question).await
    }
}

#[async_trait]
impl VectorStore for VectorDB {
    async fn create_collection(&self, collection: &str) -> Result<()> {
        VectorDB::create_collection(self, collection).await
    }

    async fn upsert_chunks(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        texts: Vec<String>,
    ) -> Result<usize> {
        VectorDB::upsert_chunks(self, collection, vectors, texts).await
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredChunk>> {
        VectorDB::search(self, collection, vector, limit).await
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        VectorDB::delete_collection(self, collection).await
    }
}

/// Orchestrates document ingestion and question answering
pub struct RagPipeline {
    embedder: Box<dyn Embedder>,
    llm: Box<dyn Generator>,
    store: Box<dyn VectorStore>,
    chunking: ChunkingConfig,
    top_k: u64,
}

impl RagPipeline {
    pub fn new(
        embedder: Box<dyn Embedder>,
        llm: Box<dyn Generator>,
        store: Box<dyn VectorStore>,
        chunking: ChunkingConfig,
        top_k: u64,
    ) -> Self {
        Self {
            embedder,
            llm,
            store,
            chunking,
            top_k,
        }
    }

    /// Fetch a PDF into a scoped temp directory and index it. The temp
    /// directory and the downloaded file are removed when this returns.
    pub async fn ingest(&self, source: &dyn PdfSource) -> Result<DocumentIndex> {
        let temp_dir = tempfile::tempdir()?;
        let pdf_path = source.fetch(temp_dir.path()).await?;
        let index = self.index_document(&pdf_path, &source.label()).await?;
        Ok(index)
    }

    /// Extract, chunk, embed, and store one PDF
    pub async fn index_document(&self, path: &Path, label: &str) -> Result<DocumentIndex> {
        let text = document::extract_text(path)?;
        let chunks = document::chunk_text(&text, self.chunking.chunk_size, self.chunking.overlap);
        if chunks.is_empty() {
            return Err(anyhow!("document produced no chunks: {}", label));
        }
        info!(label, chunks = chunks.len(), "chunked document");

        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            vectors.push(self.embedder.embed(chunk).await?);
        }

        // A fresh collection per ingestion, so stale chunks from a previous
        // document can never leak into retrieval
        let collection = format!("paper-{}", Uuid::new_v4());
        self.store.create_collection(&collection).await?;
        let count = self.store.upsert_chunks(&collection, vectors, chunks).await?;

        Ok(DocumentIndex {
            collection,
            source: label.to_string(),
            chunks: count,
        })
    }

    /// Answer a question from the indexed document.
    ///
    /// An empty or whitespace-only question is rejected before any model
    /// call is made.
    pub async fn answer(&self, index: &DocumentIndex, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(anyhow!("empty question"));
        }

        let queries = self.llm.expand_query(question).await?;
        let mut per_query = Vec::with_capacity(queries.len());
        for query in &queries {
            let vector = self.embedder.embed(query).await?;
            per_query.push(self.store.search(&index.collection, vector, self.top_k).await?);
        }

        let hits = merge_hits(per_query);
        info!(question, hits = hits.len(), "retrieved context chunks");

        let context = hits
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        self.llm.generate(&answer_prompt(&context, question)).await
    }

    /// Delete the document's collection
    pub async fn drop_index(&self, index: &DocumentIndex) -> Result<()> {
        self.store.delete_collection(&index.collection).await
    }
}
