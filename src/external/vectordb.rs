use anyhow::Result;
use qdrant_client::{
    config::QdrantConfig,
    qdrant::{
        point_id::PointIdOptions, value::Kind, vectors_config::Config, CreateCollection, Distance,
        PointId, PointStruct, SearchPoints, UpsertPoints, Value, VectorParams, VectorsConfig,
        WithPayloadSelector, WithVectorsSelector, WriteOrdering,
    },
    Qdrant,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use url::Url;

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDBConfig {
    pub host: String,
    pub port: u16,
    pub vector_size: usize,
}

impl VectorDBConfig {
    /// Get the full URL for the Qdrant service
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

impl Default for VectorDBConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6334,
            // nomic-embed-text dimension
            vector_size: 768,
        }
    }
}

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub id: u64,
    pub text: String,
    pub score: f32,
}

/// Wrapper for the Qdrant vector database
pub struct VectorDB {
    client: Qdrant,
    config: VectorDBConfig,
}

impl VectorDB {
    /// Create a new vector database client with the given configuration
    pub async fn new(config: VectorDBConfig) -> Result<Self> {
        let url = config.get_url()?;
        let qdrant_config = QdrantConfig::from_url(&url);
        let client = Qdrant::new(qdrant_config)
            .map_err(|e| ExternalError::ConnectionError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a fresh collection for one document
    pub async fn create_collection(&self, collection: &str) -> Result<()> {
        let vectors_config = VectorsConfig {
            config: Some(Config::Params(VectorParams {
                size: self.config.vector_size as u64,
                distance: Distance::Cosine.into(),
                ..Default::default()
            })),
        };

        let create_collection = CreateCollection {
            collection_name: collection.to_string(),
            vectors_config: Some(vectors_config),
            ..Default::default()
        };

        self.client
            .create_collection(create_collection)
            .await
            .map_err(|e| ExternalError::VectorDBError(e.to_string()))?;

        info!(collection, "created collection");
        Ok(())
    }

    /// Insert chunk vectors with their text as payload.
    ///
    /// `vectors` and `texts` must be the same length and in chunk order;
    /// the point id is the chunk index.
    pub async fn upsert_chunks(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        texts: Vec<String>,
    ) -> Result<usize> {
        let points: Vec<PointStruct> = vectors
            .into_iter()
            .zip(texts)
            .enumerate()
            .map(|(i, (vector, text))| {
                let payload: HashMap<String, Value> =
                    [("text".to_string(), Value::from(text))].into_iter().collect();

                PointStruct {
                    id: Some(PointId {
                        point_id_options: Some(PointIdOptions::Num(i as u64)),
                    }),
                    payload,
                    vectors: Some(vector.into()),
                }
            })
            .collect();

        let count = points.len();
        let upsert_points = UpsertPoints {
            collection_name: collection.to_string(),
            points,
            ordering: Some(WriteOrdering::default()),
            ..Default::default()
        };

        self.client
            .upsert_points(upsert_points)
            .await
            .map_err(|e| ExternalError::VectorDBError(e.to_string()))?;

        info!(collection, count, "upserted chunks");
        Ok(count)
    }

    /// Search for the chunks most similar to a query vector
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredChunk>> {
        let search_request = SearchPoints {
            collection_name: collection.to_string(),
            vector,
            limit,
            with_payload: Some(WithPayloadSelector::from(true)),
            with_vectors: Some(WithVectorsSelector::from(false)),
            ..Default::default()
        };

        let results = self
            .client
            .search_points(search_request)
            .await
            .map_err(|e| ExternalError::VectorDBError(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|r| {
                let id = r.id.and_then(|id| match id.point_id_options {
                    Some(PointIdOptions::Num(num)) => Some(num),
                    _ => None,
                })?;
                let text = r.payload.get("text").and_then(|v| match &v.kind {
                    Some(Kind::StringValue(s)) => Some(s.clone()),
                    _ => None,
                })?;
                Some(ScoredChunk {
                    id,
                    text,
                    score: r.score,
                })
            })
            .collect())
    }

    /// Drop a whole collection
    pub async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.client
            .delete_collection(collection)
            .await
            .map_err(|e| ExternalError::VectorDBError(e.to_string()))?;

        info!(collection, "deleted collection");
        Ok(())
    }
}

/// Merge hits from several retrieval queries: dedupe by point id keeping the
/// best score, order by descending score.
pub fn merge_hits(per_query: Vec<Vec<ScoredChunk>>) -> Vec<ScoredChunk> {
    let mut best: HashMap<u64, ScoredChunk> = HashMap::new();

    for hits in per_query {
        for hit in hits {
            match best.get(&hit.id) {
                Some(existing) if existing.score >= hit.score => {}
                _ => {
                    best.insert(hit.id, hit);
                }
            }
        }
    }

    let mut merged: Vec<ScoredChunk> = best.into_values().collect();
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    merged
}
