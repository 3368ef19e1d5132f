//! Portable export and import of a collection.
//!
//! Exports carry id, text, and metadata only. Embeddings are deliberately
//! excluded: they are reconstructible by re-embedding `text`, and leaving
//! them out keeps the format portable across embedding models. Import is
//! therefore a re-derivation step, not a raw restore — importing with a
//! different provider yields different vectors.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Metadata;
use crate::error::Result;
use crate::ingest::BatchIngestor;
use crate::store::DocumentStore;

/// One document in an export: id, text, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedDocument {
    /// Document id.
    pub id: String,
    /// The document's text content.
    #[serde(rename = "document")]
    pub text: String,
    /// The document's metadata.
    pub metadata: Metadata,
}

/// A portable snapshot of one collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionExport {
    /// The exported collection's name.
    pub collection_name: String,
    /// Number of documents in the export.
    pub total_documents: usize,
    /// When the export was taken.
    pub export_timestamp: DateTime<Utc>,
    /// The exported documents. Order is backend-defined.
    pub documents: Vec<ExportedDocument>,
}

/// Serializes a collection to and from the portable export shape.
pub struct Exporter {
    store: Arc<DocumentStore>,
}

impl Exporter {
    /// Create a new exporter backed by the given store.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Snapshot the collection as a [`CollectionExport`].
    pub async fn export(&self, collection: &str) -> Result<CollectionExport> {
        let documents = self.store.get_all(collection).await?;
        let documents: Vec<ExportedDocument> = documents
            .into_iter()
            .map(|doc| ExportedDocument { id: doc.id, text: doc.text, metadata: doc.metadata })
            .collect();
        info!(collection, total = documents.len(), "exported collection");
        Ok(CollectionExport {
            collection_name: collection.to_string(),
            total_documents: documents.len(),
            export_timestamp: Utc::now(),
            documents,
        })
    }

    /// Export the collection to a JSON file. Returns the document count.
    pub async fn export_to_json(&self, collection: &str, path: impl AsRef<Path>) -> Result<usize> {
        let export = self.export(collection).await?;
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), &export)?;
        Ok(export.total_documents)
    }

    /// Import records into the collection, re-deriving every embedding
    /// through the store's provider via chunked ingestion.
    ///
    /// Returns the imported ids. Existing documents with matching ids are
    /// overwritten (upsert semantics). An omitted `chunk_size` falls back
    /// to the store's configured `default_batch_size`.
    pub async fn import(
        &self,
        collection: &str,
        export: CollectionExport,
        chunk_size: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut texts = Vec::with_capacity(export.documents.len());
        let mut metadatas = Vec::with_capacity(export.documents.len());
        let mut ids = Vec::with_capacity(export.documents.len());
        for document in export.documents {
            texts.push(document.text);
            metadatas.push(document.metadata);
            ids.push(document.id);
        }

        let ingestor = BatchIngestor::new(self.store.clone());
        let ids = ingestor.ingest(collection, texts, Some(metadatas), Some(ids), chunk_size).await?;
        info!(collection, total = ids.len(), "imported collection");
        Ok(ids)
    }

    /// Import records from a JSON file produced by
    /// [`export_to_json`](Exporter::export_to_json).
    pub async fn import_from_json(
        &self,
        collection: &str,
        path: impl AsRef<Path>,
        chunk_size: Option<usize>,
    ) -> Result<Vec<String>> {
        let file = File::open(path.as_ref())?;
        let export: CollectionExport = serde_json::from_reader(BufReader::new(file))?;
        self.import(collection, export, chunk_size).await
    }
}
