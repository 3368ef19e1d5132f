//! Aggregate statistics over a collection's metadata.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::store::DocumentStore;

/// Aggregate view of one collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionStats {
    /// Number of documents in the collection.
    pub total_documents: usize,
    /// Union of metadata keys seen across all documents, sorted.
    pub metadata_fields: Vec<String>,
    /// Per-field count of distinct stringified values. Documents lacking
    /// a field do not contribute to that field's cardinality.
    pub metadata_unique_counts: HashMap<String, usize>,
}

/// Computes [`CollectionStats`] by scanning every document once.
pub struct StatisticsCollector {
    store: Arc<DocumentStore>,
}

impl StatisticsCollector {
    /// Create a new collector backed by the given store.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Compute statistics for the named collection.
    pub async fn statistics(&self, collection: &str) -> Result<CollectionStats> {
        let documents = self.store.get_all(collection).await?;

        let mut values_by_field: HashMap<String, HashSet<String>> = HashMap::new();
        for document in &documents {
            for (key, value) in &document.metadata {
                values_by_field.entry(key.clone()).or_default().insert(value.to_string());
            }
        }

        let mut metadata_fields: Vec<String> = values_by_field.keys().cloned().collect();
        metadata_fields.sort();
        let metadata_unique_counts =
            values_by_field.into_iter().map(|(field, values)| (field, values.len())).collect();

        let stats = CollectionStats {
            total_documents: documents.len(),
            metadata_fields,
            metadata_unique_counts,
        };
        info!(collection, total = stats.total_documents, "computed collection statistics");
        Ok(stats)
    }
}
