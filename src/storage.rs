//! Storage backend trait: the persistence collaborator contract.

use async_trait::async_trait;

use crate::document::{Document, Metadata};
use crate::error::Result;

/// A persistence backend managing named collections of documents.
///
/// The store addresses all state through this trait; it holds no document
/// state of its own. Implementations own the physical layout and whatever
/// index accelerates [`nearest`](StorageBackend::nearest) — the store only
/// requires the contract below.
///
/// Ranking contract for `nearest`: results come back ordered ascending by
/// distance (smaller is more similar), ties broken by document id
/// ascending, truncated to `k`.
///
/// # Example
///
/// ```rust,ignore
/// use vecdoc::{InMemoryBackend, StorageBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.create_collection("docs").await?;
/// backend.upsert("docs", &documents).await?;
/// let ranked = backend.nearest("docs", &query, 5, None).await?;
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Drop a named collection and all its data, including its dimension
    /// lock. No-op if it does not exist.
    async fn drop_collection(&self, name: &str) -> Result<()>;

    /// Return the collection's locked embedding dimension, or `None` if no
    /// document has ever been upserted since creation (or the last drop).
    async fn dimension(&self, collection: &str) -> Result<Option<usize>>;

    /// Insert-or-overwrite documents by id.
    ///
    /// The first successful upsert locks the collection's dimension to the
    /// documents' embedding length.
    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<()>;

    /// Fetch a document by id, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Fetch every document. Order is backend-defined and not guaranteed
    /// stable across calls.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Delete documents by id. Absent ids are skipped. Returns the number
    /// of documents actually removed.
    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<usize>;

    /// Delete every document whose metadata contains all of `filter`'s
    /// key-value pairs (equality `AND` semantics). Returns the number of
    /// documents removed.
    async fn delete_by_filter(&self, collection: &str, filter: &Metadata) -> Result<usize>;

    /// Return the `k` nearest documents to `embedding` as `(id, distance)`
    /// pairs, optionally restricted to documents matching `filter`.
    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        filter: Option<&Metadata>,
    ) -> Result<Vec<(String, f32)>>;

    /// Return the number of documents in the collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Check whether `metadata` contains every key-value pair of `filter`.
///
/// Equality `AND` semantics; an empty filter matches everything.
pub fn matches_filter(metadata: &Metadata, filter: &Metadata) -> bool {
    filter.iter().all(|(key, value)| metadata.get(key) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MetadataValue;

    fn meta(pairs: &[(&str, MetadataValue)]) -> Metadata {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn filter_requires_all_pairs() {
        let doc = meta(&[("category", "ai".into()), ("year", 2024i64.into())]);
        assert!(matches_filter(&doc, &meta(&[("category", "ai".into())])));
        assert!(matches_filter(
            &doc,
            &meta(&[("category", "ai".into()), ("year", 2024i64.into())])
        ));
        assert!(!matches_filter(
            &doc,
            &meta(&[("category", "ai".into()), ("year", 2023i64.into())])
        ));
        assert!(!matches_filter(&doc, &meta(&[("missing", true.into())])));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches_filter(&Metadata::new(), &Metadata::new()));
        assert!(matches_filter(&meta(&[("a", "b".into())]), &Metadata::new()));
    }
}
