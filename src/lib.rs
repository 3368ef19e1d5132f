//! # vecdoc
//!
//! A collection-oriented vector document store: text documents with
//! fixed-dimension embeddings and scalar metadata, answering
//! nearest-neighbor and hybrid (semantic + lexical) similarity queries.
//!
//! The crate is organized around two collaborator seams:
//!
//! - [`EmbeddingProvider`] — turns text into fixed-length vectors
//! - [`StorageBackend`] — persists documents and serves `nearest` queries
//!
//! Everything else composes over those traits:
//!
//! - [`DocumentStore`] — collection lifecycle and document CRUD
//! - [`BatchIngestor`] — chunked bulk insertion, including CSV sources
//! - [`QueryEngine`] — similarity and hybrid search
//! - [`StatisticsCollector`] — metadata aggregates
//! - [`Exporter`] — portable JSON export/import
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vecdoc::{DocumentStore, InMemoryBackend, QueryEngine};
//!
//! let store = Arc::new(
//!     DocumentStore::builder()
//!         .embedding_provider(Arc::new(my_embedder))
//!         .storage_backend(Arc::new(InMemoryBackend::new()))
//!         .build()?,
//! );
//!
//! let id = store.add("docs", "Dogs are loyal animals", None, None).await?;
//!
//! let engine = QueryEngine::new(store.clone());
//! let hits = engine.search_similar("docs", "animal", Some(5), None).await?;
//! ```

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod export;
pub mod ingest;
pub mod memory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod query;
pub mod stats;
pub mod storage;
pub mod store;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use document::{Document, DocumentView, HybridHit, Metadata, MetadataValue, SearchHit};
pub use embedding::EmbeddingProvider;
pub use error::{Result, StoreError};
pub use export::{CollectionExport, ExportedDocument, Exporter};
pub use ingest::BatchIngestor;
pub use memory::InMemoryBackend;
pub use query::{QueryEngine, SearchBenchmark};
pub use stats::{CollectionStats, StatisticsCollector};
pub use storage::StorageBackend;
pub use store::{DocumentStore, DocumentStoreBuilder};
