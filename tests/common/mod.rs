//! Shared test support: deterministic embedders and store harnesses.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use vecdoc::{
    Document, DocumentStore, EmbeddingProvider, InMemoryBackend, Metadata, MetadataValue, Result,
    StorageBackend, StoreConfig, StoreError,
};

/// Default embedding dimension for test embedders.
pub const DIM: usize = 256;

/// A deterministic embedding provider hashing character trigrams into a
/// fixed-size term-frequency vector, L2-normalized.
///
/// Deterministic and meaning-bearing enough for ranking tests: texts
/// sharing word fragments ("animal" / "animals") land close together,
/// unrelated texts stay orthogonal.
pub struct TrigramEmbedder {
    dim: usize,
}

impl TrigramEmbedder {
    pub fn new() -> Self {
        Self { dim: DIM }
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for word in text.to_lowercase().split_whitespace() {
            let padded: Vec<char> = format!("^{word}$").chars().collect();
            for trigram in padded.windows(3) {
                v[fnv1a(trigram) as usize % self.dim] += 1.0;
            }
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

/// FNV-1a over the trigram's UTF-32 code units; stable across runs.
fn fnv1a(chars: &[char]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for c in chars {
        for byte in (*c as u32).to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for TrigramEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dim
    }
}

/// An embedder whose `embed_batch` fails from the Nth call onward, for
/// partial-ingest failure tests.
pub struct FlakyEmbedder {
    inner: TrigramEmbedder,
    fail_from_batch: usize,
    batches: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn failing_from_batch(fail_from_batch: usize) -> Self {
        Self { inner: TrigramEmbedder::new(), fail_from_batch, batches: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let call = self.batches.fetch_add(1, Ordering::SeqCst);
        if call >= self.fail_from_batch {
            return Err(StoreError::Embedding {
                provider: "flaky".to_string(),
                message: format!("simulated failure on batch {call}"),
            });
        }
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// A backend wrapper counting upsert calls, for chunk-commit assertions.
pub struct CountingBackend {
    inner: InMemoryBackend,
    upserts: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self { inner: InMemoryBackend::new(), upserts: AtomicUsize::new(0) }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for CountingBackend {
    async fn create_collection(&self, name: &str) -> Result<()> {
        self.inner.create_collection(name).await
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        self.inner.drop_collection(name).await
    }

    async fn dimension(&self, collection: &str) -> Result<Option<usize>> {
        self.inner.dimension(collection).await
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(collection, documents).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.inner.get_all(collection).await
    }

    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<usize> {
        self.inner.delete(collection, ids).await
    }

    async fn delete_by_filter(&self, collection: &str, filter: &Metadata) -> Result<usize> {
        self.inner.delete_by_filter(collection, filter).await
    }

    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<(String, f32)>> {
        self.inner.nearest(collection, embedding, k, filter).await
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.inner.count(collection).await
    }
}

/// Build a store over a fresh in-memory backend and trigram embedder.
/// Returns the backend too so tests can inspect stored embeddings.
pub fn trigram_store() -> (Arc<DocumentStore>, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    let store = DocumentStore::builder()
        .embedding_provider(Arc::new(TrigramEmbedder::new()))
        .storage_backend(backend.clone())
        .build()
        .unwrap();
    (Arc::new(store), backend)
}

/// Build a store over the given collaborators.
pub fn store_with(
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn StorageBackend>,
) -> Arc<DocumentStore> {
    Arc::new(
        DocumentStore::builder()
            .embedding_provider(embedder)
            .storage_backend(backend)
            .build()
            .unwrap(),
    )
}

/// Build a store over the given collaborators with an explicit config.
pub fn store_with_config(
    config: StoreConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn StorageBackend>,
) -> Arc<DocumentStore> {
    Arc::new(
        DocumentStore::builder()
            .config(config)
            .embedding_provider(embedder)
            .storage_backend(backend)
            .build()
            .unwrap(),
    )
}

/// Build a metadata map from key-value pairs.
pub fn meta(pairs: &[(&str, MetadataValue)]) -> Metadata {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}
