//! The document store: collection lifecycle and document CRUD.
//!
//! [`DocumentStore`] composes an [`EmbeddingProvider`] and a
//! [`StorageBackend`] behind one handle. Collections are addressed by name
//! on every call and created on first access. Construct a store via
//! [`DocumentStore::builder()`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vecdoc::{DocumentStore, InMemoryBackend};
//!
//! let store = DocumentStore::builder()
//!     .embedding_provider(Arc::new(my_embedder))
//!     .storage_backend(Arc::new(InMemoryBackend::new()))
//!     .build()?;
//!
//! let id = store.add("docs", "hello world", None, None).await?;
//! let doc = store.get("docs", &id).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::document::{Document, DocumentView, Metadata};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, StoreError};
use crate::storage::StorageBackend;

/// A collection-oriented store of documents with vector embeddings.
///
/// Writes to a given collection are serialized through one lock per
/// collection name; each mutating call is atomic with respect to other
/// calls on the same collection. Reads go straight to the backend and see
/// whatever it currently holds.
pub struct DocumentStore {
    config: StoreConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn StorageBackend>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentStore {
    /// Create a new [`DocumentStoreBuilder`].
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    /// Return a reference to the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Return a reference to the storage backend.
    pub fn storage_backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Return the write lock for a collection name, creating it on demand.
    pub(crate) async fn collection_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(name.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Ensure the collection exists. Collections are created on first
    /// access, so every operation funnels through here.
    async fn ensure(&self, collection: &str) -> Result<()> {
        self.backend.create_collection(collection).await
    }

    /// Reject embeddings whose length disagrees with the collection's
    /// locked dimension. Must be called before any write reaches the
    /// backend. A collection with no locked dimension accepts the first
    /// embedding's length as the new lock.
    async fn check_dimension(&self, collection: &str, embeddings: &[Vec<f32>]) -> Result<()> {
        let Some(first) = embeddings.first() else {
            return Ok(());
        };
        let expected = self.backend.dimension(collection).await?.unwrap_or(first.len());
        for embedding in embeddings {
            if embedding.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }
        Ok(())
    }

    // ── Collection lifecycle ───────────────────────────────────────

    /// Return the named collection, creating an empty one if needed.
    pub async fn get_or_create(&self, collection: &str) -> Result<()> {
        self.ensure(collection).await
    }

    /// Destroy and recreate the collection empty under the same name.
    ///
    /// The dimension lock is forgotten; the next insert re-establishes it.
    /// Never fails merely because the collection did not exist.
    pub async fn reset(&self, collection: &str) -> Result<()> {
        let lock = self.collection_lock(collection).await;
        {
            let _guard = lock.lock().await;
            self.backend.drop_collection(collection).await?;
            self.backend.create_collection(collection).await?;
        }
        drop(lock);
        self.prune_lock(collection).await;
        info!(collection, "reset collection");
        Ok(())
    }

    /// Drop the collection's lock entry if no other task holds a handle to
    /// it. Keeps the lock map from growing with every reset collection name.
    async fn prune_lock(&self, collection: &str) {
        let mut locks = self.locks.lock().await;
        if locks.get(collection).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(collection);
        }
    }

    // ── Create ─────────────────────────────────────────────────────

    /// Add a single document and return its id.
    ///
    /// A fresh v4 UUID is generated when `id` is omitted; missing metadata
    /// defaults to an empty map. Inserting an existing id overwrites
    /// (upsert semantics).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Embedding`] if the provider fails and
    /// [`StoreError::DimensionMismatch`] if the embedding disagrees with
    /// the collection's locked dimension; nothing is written in either case.
    pub async fn add(
        &self,
        collection: &str,
        text: &str,
        metadata: Option<Metadata>,
        id: Option<String>,
    ) -> Result<String> {
        self.ensure(collection).await?;
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let embedding = self.embedder.embed(text).await?;

        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        self.check_dimension(collection, std::slice::from_ref(&embedding)).await?;
        let document = Document {
            id: id.clone(),
            text: text.to_string(),
            embedding,
            metadata: metadata.unwrap_or_default(),
        };
        self.backend.upsert(collection, std::slice::from_ref(&document)).await?;

        info!(collection, document.id = %id, "added document");
        Ok(id)
    }

    /// Add multiple documents in one batched embedding call.
    ///
    /// Missing `metadatas` defaults to one empty map per text; missing
    /// `ids` generates one fresh UUID per text. When supplied, both lists
    /// must match `texts` in length.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] on mismatched lengths,
    /// before any embedding is computed.
    pub async fn add_batch(
        &self,
        collection: &str,
        texts: &[String],
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>> {
        if let Some(metadatas) = &metadatas {
            if metadatas.len() != texts.len() {
                return Err(StoreError::InvalidArgument(format!(
                    "metadatas length ({}) does not match texts length ({})",
                    metadatas.len(),
                    texts.len()
                )));
            }
        }
        if let Some(ids) = &ids {
            if ids.len() != texts.len() {
                return Err(StoreError::InvalidArgument(format!(
                    "ids length ({}) does not match texts length ({})",
                    ids.len(),
                    texts.len()
                )));
            }
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure(collection).await?;

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&refs).await?;
        if embeddings.len() != texts.len() {
            return Err(StoreError::Embedding {
                provider: "batch".to_string(),
                message: format!(
                    "provider returned {} embeddings for {} texts",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }

        let ids = ids.unwrap_or_else(|| texts.iter().map(|_| Uuid::new_v4().to_string()).collect());
        let metadatas = metadatas.unwrap_or_else(|| vec![Metadata::new(); texts.len()]);

        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        self.check_dimension(collection, &embeddings).await?;
        let documents: Vec<Document> = ids
            .iter()
            .zip(texts)
            .zip(embeddings)
            .zip(metadatas)
            .map(|(((id, text), embedding), metadata)| Document {
                id: id.clone(),
                text: text.clone(),
                embedding,
                metadata,
            })
            .collect();
        self.backend.upsert(collection, &documents).await?;

        info!(collection, count = documents.len(), "added document batch");
        Ok(ids)
    }

    // ── Read ───────────────────────────────────────────────────────

    /// Fetch a document by id, or `None` if absent. Never errors for a
    /// missing id. Embeddings are internal and not returned.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentView>> {
        self.ensure(collection).await?;
        Ok(self.backend.get(collection, id).await?.map(DocumentView::from))
    }

    /// Fetch every document in the collection. Order is backend-defined.
    pub async fn get_all(&self, collection: &str) -> Result<Vec<DocumentView>> {
        self.ensure(collection).await?;
        let documents = self.backend.get_all(collection).await?;
        Ok(documents.into_iter().map(DocumentView::from).collect())
    }

    /// Return the number of documents in the collection.
    pub async fn count(&self, collection: &str) -> Result<usize> {
        self.ensure(collection).await?;
        self.backend.count(collection).await
    }

    // ── Update ─────────────────────────────────────────────────────

    /// Update a document's text and/or metadata in place.
    ///
    /// A text change regenerates the embedding; a metadata-only change
    /// leaves the embedding untouched. Returns `false` without error when
    /// the id does not exist, when neither field is supplied, or when a
    /// collaborator fails mid-update.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        text: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<bool> {
        if text.is_none() && metadata.is_none() {
            debug!(collection, document.id = %id, "update called with no fields");
            return Ok(false);
        }
        self.ensure(collection).await?;

        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        match self.apply_update(collection, id, text, metadata).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                error!(collection, document.id = %id, error = %e, "update failed");
                Ok(false)
            }
        }
    }

    async fn apply_update(
        &self,
        collection: &str,
        id: &str,
        text: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<bool> {
        let Some(mut document) = self.backend.get(collection, id).await? else {
            return Ok(false);
        };
        if let Some(text) = text {
            let embedding = self.embedder.embed(text).await?;
            self.check_dimension(collection, std::slice::from_ref(&embedding)).await?;
            document.text = text.to_string();
            document.embedding = embedding;
        }
        if let Some(metadata) = metadata {
            document.metadata = metadata;
        }
        self.backend.upsert(collection, std::slice::from_ref(&document)).await?;
        info!(collection, document.id = %id, "updated document");
        Ok(true)
    }

    // ── Delete ─────────────────────────────────────────────────────

    /// Delete a document by id. Idempotent: returns `false` without error
    /// for an absent id.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.ensure(collection).await?;
        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        match self.backend.delete(collection, &[id]).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(collection, document.id = %id, "deleted document");
                }
                Ok(removed > 0)
            }
            Err(e) => {
                error!(collection, document.id = %id, error = %e, "delete failed");
                Ok(false)
            }
        }
    }

    /// Delete multiple documents by id.
    ///
    /// Returns `true` when the underlying delete completes for the whole
    /// set (absent ids are skipped, not failures) and `false` when it
    /// fails; no per-id detail is reported.
    pub async fn delete_batch(&self, collection: &str, ids: &[&str]) -> Result<bool> {
        self.ensure(collection).await?;
        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        match self.backend.delete(collection, ids).await {
            Ok(removed) => {
                info!(collection, requested = ids.len(), removed, "deleted document batch");
                Ok(true)
            }
            Err(e) => {
                error!(collection, requested = ids.len(), error = %e, "batch delete failed");
                Ok(false)
            }
        }
    }

    /// Delete every document whose metadata contains all of `filter`'s
    /// key-value pairs (equality `AND` semantics).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] for an empty filter; a
    /// filter is required so this cannot silently clear a collection.
    pub async fn delete_by_filter(&self, collection: &str, filter: &Metadata) -> Result<bool> {
        if filter.is_empty() {
            return Err(StoreError::InvalidArgument(
                "delete_by_filter requires a non-empty filter".to_string(),
            ));
        }
        self.ensure(collection).await?;
        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        let removed = self.backend.delete_by_filter(collection, filter).await?;
        info!(collection, removed, "deleted documents by filter");
        Ok(true)
    }

    /// Delete every document in the collection.
    ///
    /// Unlike [`reset`](DocumentStore::reset), the dimension lock is kept:
    /// subsequent inserts must still match the established dimension.
    pub async fn clear(&self, collection: &str) -> Result<bool> {
        self.ensure(collection).await?;
        let lock = self.collection_lock(collection).await;
        let _guard = lock.lock().await;
        let documents = self.backend.get_all(collection).await?;
        if !documents.is_empty() {
            let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
            self.backend.delete(collection, &ids).await?;
        }
        info!(collection, removed = documents.len(), "cleared collection");
        Ok(true)
    }
}

/// Builder for constructing a [`DocumentStore`].
///
/// The embedding provider and storage backend are required; the config
/// defaults to [`StoreConfig::default()`].
#[derive(Default)]
pub struct DocumentStoreBuilder {
    config: Option<StoreConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    backend: Option<Arc<dyn StorageBackend>>,
}

impl DocumentStoreBuilder {
    /// Set the store configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    /// Set the storage backend.
    pub fn storage_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build the [`DocumentStore`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the embedding provider or storage
    /// backend is missing.
    pub fn build(self) -> Result<DocumentStore> {
        let embedder = self
            .embedder
            .ok_or_else(|| StoreError::Config("embedding_provider is required".to_string()))?;
        let backend = self
            .backend
            .ok_or_else(|| StoreError::Config("storage_backend is required".to_string()))?;
        Ok(DocumentStore {
            config: self.config.unwrap_or_default(),
            embedder,
            backend,
            locks: Mutex::new(HashMap::new()),
        })
    }
}
