//! In-memory storage backend using brute-force cosine distance.
//!
//! This module provides [`InMemoryBackend`], a reference implementation of
//! [`StorageBackend`] backed by nested `HashMap`s behind a
//! `tokio::sync::RwLock`. Suitable for development, testing, and
//! small-scale use; production deployments plug a real engine into the
//! same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Document, Metadata};
use crate::error::{Result, StoreError};
use crate::storage::{StorageBackend, matches_filter};

/// Per-collection state: the dimension lock plus the documents by id.
#[derive(Debug, Default)]
struct CollectionData {
    dimension: Option<usize>,
    documents: HashMap<String, Document>,
}

/// An in-memory [`StorageBackend`] using cosine distance for search.
///
/// Collections are stored as collection name → document id → document.
/// All operations are async-safe via `tokio::sync::RwLock`. Search is a
/// linear scan; there is no acceleration index.
///
/// # Example
///
/// ```rust,ignore
/// use vecdoc::{InMemoryBackend, StorageBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.create_collection("docs").await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl InMemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(collection: &str) -> StoreError {
        StoreError::Backend {
            backend: "in-memory".to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }
}

/// Compute cosine distance (`1 - cosine similarity`) between two vectors.
///
/// Both vectors are L2-normalized before the dot product. Returns 1.0
/// (maximal dissimilarity short of opposition) if either vector has zero
/// magnitude.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn dimension(&self, collection: &str) -> Result<Option<usize>> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(data.dimension)
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        for document in documents {
            let dimension = *data.dimension.get_or_insert(document.embedding.len());
            if document.embedding.len() != dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: dimension,
                    actual: document.embedding.len(),
                });
            }
            data.documents.insert(document.id.clone(), document.clone());
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(data.documents.get(id).cloned())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(data.documents.values().cloned().collect())
    }

    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        let mut removed = 0;
        for id in ids {
            if data.documents.remove(*id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_by_filter(&self, collection: &str, filter: &Metadata) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        let before = data.documents.len();
        data.documents.retain(|_, doc| !matches_filter(&doc.metadata, filter));
        Ok(before - data.documents.len())
    }

    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<(String, f32)>> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut ranked: Vec<(String, f32)> = data
            .documents
            .values()
            .filter(|doc| filter.is_none_or(|f| matches_filter(&doc.metadata, f)))
            .map(|doc| (doc.id.clone(), cosine_distance(&doc.embedding, embedding)))
            .collect();

        // Ascending distance, id tiebreak for determinism.
        ranked.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        Ok(ranked)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(data.documents.len())
    }
}
