//! Chunked bulk ingestion.
//!
//! [`BatchIngestor`] makes large loads practical by splitting the input
//! into consecutive chunks, embedding each chunk with one batched provider
//! call, and committing chunks strictly in order. Chunking bounds how much
//! work is lost on a mid-load failure: committed chunks stay committed and
//! the error names the first failing chunk.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::document::{Metadata, MetadataValue};
use crate::error::{Result, StoreError};
use crate::store::DocumentStore;

/// Bulk loader that feeds a [`DocumentStore`] in bounded sequential chunks.
///
/// # Example
///
/// ```rust,ignore
/// use vecdoc::BatchIngestor;
///
/// let ingestor = BatchIngestor::new(store.clone());
/// let ids = ingestor.ingest("docs", texts, None, None, None).await?;
/// ```
pub struct BatchIngestor {
    store: Arc<DocumentStore>,
}

impl BatchIngestor {
    /// Create a new ingestor backed by the given store.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Ingest documents in chunks of at most `chunk_size` items.
    ///
    /// Missing `metadatas`/`ids` default the same way as
    /// [`DocumentStore::add_batch`]; an omitted `chunk_size` falls back to
    /// the store's configured `default_batch_size`. Chunks are embedded and
    /// committed strictly in order: chunk *i* completes (or fails) before
    /// chunk *i + 1* begins. Returns every id on full success.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] for `chunk_size == 0` or
    /// mismatched list lengths (before any embedding is computed), and
    /// [`StoreError::IngestFailed`] when a chunk fails, carrying the count
    /// of fully committed items and the index of the failing chunk.
    pub async fn ingest(
        &self,
        collection: &str,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
        chunk_size: Option<usize>,
    ) -> Result<Vec<String>> {
        let chunk_size = chunk_size.unwrap_or(self.store.config().default_batch_size);
        if chunk_size == 0 {
            return Err(StoreError::InvalidArgument(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
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

        let total = texts.len();
        let ids: Vec<String> =
            ids.unwrap_or_else(|| (0..total).map(|_| Uuid::new_v4().to_string()).collect());
        let metadatas: Vec<Metadata> = metadatas.unwrap_or_else(|| vec![Metadata::new(); total]);
        let total_chunks = total.div_ceil(chunk_size);

        let mut committed = 0;
        for (chunk_index, offset) in (0..total).step_by(chunk_size).enumerate() {
            let end = (offset + chunk_size).min(total);
            let result = self
                .store
                .add_batch(
                    collection,
                    &texts[offset..end],
                    Some(metadatas[offset..end].to_vec()),
                    Some(ids[offset..end].to_vec()),
                )
                .await;
            match result {
                Ok(_) => {
                    committed = end;
                    info!(
                        collection,
                        chunk = chunk_index + 1,
                        total_chunks,
                        committed,
                        "committed ingest chunk"
                    );
                }
                Err(e) => {
                    error!(
                        collection,
                        chunk = chunk_index,
                        committed,
                        error = %e,
                        "ingest chunk failed"
                    );
                    return Err(StoreError::IngestFailed {
                        committed,
                        chunk: chunk_index,
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(ids)
    }

    /// Ingest documents from a CSV file.
    ///
    /// One row becomes one document: `text_column` supplies the text and
    /// each of `metadata_columns` becomes a metadata field (cells are
    /// parsed as bool, then number, then string). When no metadata columns
    /// are given, each row gets fallback metadata `{source: "csv", row: i}`.
    /// Row ids are `csv_doc_{i}` by ordinal index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when a named column is not
    /// present in the header row.
    pub async fn ingest_csv(
        &self,
        collection: &str,
        path: impl AsRef<Path>,
        text_column: &str,
        metadata_columns: &[&str],
        chunk_size: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers = reader.headers()?.clone();

        let text_index = headers.iter().position(|h| h == text_column).ok_or_else(|| {
            StoreError::InvalidArgument(format!("text column '{text_column}' not found in CSV"))
        })?;
        let metadata_indexes: Vec<(usize, String)> = metadata_columns
            .iter()
            .map(|column| {
                headers
                    .iter()
                    .position(|h| h == *column)
                    .map(|i| (i, column.to_string()))
                    .ok_or_else(|| {
                        StoreError::InvalidArgument(format!(
                            "metadata column '{column}' not found in CSV"
                        ))
                    })
            })
            .collect::<Result<_>>()?;

        let mut texts = Vec::new();
        let mut metadatas = Vec::new();
        let mut ids = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let text = record.get(text_index).unwrap_or_default().to_string();

            let metadata = if metadata_indexes.is_empty() {
                let mut fallback = Metadata::new();
                fallback.insert("source".to_string(), "csv".into());
                fallback.insert("row".to_string(), (row as i64).into());
                fallback
            } else {
                metadata_indexes
                    .iter()
                    .map(|(index, column)| {
                        let cell = record.get(*index).unwrap_or_default();
                        (column.clone(), parse_scalar(cell))
                    })
                    .collect()
            };

            texts.push(text);
            metadatas.push(metadata);
            ids.push(format!("csv_doc_{row}"));
        }

        info!(collection, rows = texts.len(), "ingesting CSV rows");
        self.ingest(collection, texts, Some(metadatas), Some(ids), chunk_size).await
    }
}

/// Parse a CSV cell into the narrowest matching scalar: bool, number,
/// then string.
fn parse_scalar(cell: &str) -> MetadataValue {
    match cell {
        "true" => return MetadataValue::Bool(true),
        "false" => return MetadataValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = cell.parse::<f64>() {
        return MetadataValue::Num(n);
    }
    MetadataValue::Str(cell.to_string())
}
