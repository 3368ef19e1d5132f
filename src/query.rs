//! Semantic and hybrid similarity queries.
//!
//! [`QueryEngine`] answers two kinds of question over one collection:
//! pure vector nearest-neighbor search ([`search_similar`](QueryEngine::search_similar))
//! and hybrid semantic-plus-lexical ranking
//! ([`hybrid_search`](QueryEngine::hybrid_search)). Hybrid search exists
//! because pure vector search misses exact-term matches (rare identifiers,
//! product codes) that cheap token overlap catches; it over-fetches a
//! constant factor of candidates and re-ranks them lexically.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::document::{HybridHit, Metadata, SearchHit};
use crate::error::{Result, StoreError};
use crate::store::DocumentStore;

/// Similarity query engine over a [`DocumentStore`].
///
/// # Example
///
/// ```rust,ignore
/// use vecdoc::QueryEngine;
///
/// let engine = QueryEngine::new(store.clone());
/// let hits = engine.search_similar("docs", "search query", Some(5), None).await?;
/// let hybrid = engine.hybrid_search("docs", "search query", Some(5), Some(0.3)).await?;
/// ```
pub struct QueryEngine {
    store: Arc<DocumentStore>,
}

impl QueryEngine {
    /// Create a new query engine backed by the given store.
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Return the `k` most similar documents to `query_text`.
    ///
    /// The query is embedded, the backend returns the nearest stored
    /// embeddings by cosine distance (smaller is more similar), optionally
    /// restricted to documents matching `filter` (equality `AND`
    /// semantics), and results come back ascending by distance with ties
    /// broken by document id. An omitted `k` falls back to the store's
    /// configured `default_top_k`.
    pub async fn search_similar(
        &self,
        collection: &str,
        query_text: &str,
        k: Option<usize>,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchHit>> {
        let k = k.unwrap_or(self.store.config().default_top_k);
        let started = Instant::now();
        self.store.get_or_create(collection).await?;
        let embedding = self.store.embedding_provider().embed(query_text).await?;
        let ranked = self
            .store
            .storage_backend()
            .nearest(collection, &embedding, k, filter)
            .await?;

        let mut hits = Vec::with_capacity(ranked.len());
        for (id, distance) in ranked {
            // Hydrate each ranked id; a document deleted between ranking
            // and hydration is skipped (read-committed semantics).
            if let Some(document) = self.store.storage_backend().get(collection, &id).await? {
                hits.push(SearchHit {
                    id: document.id,
                    text: document.text,
                    metadata: document.metadata,
                    distance,
                });
            }
        }
        // Re-apply the ranking contract: ascending distance, id tiebreak.
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        info!(
            collection,
            k,
            result_count = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "similarity search completed"
        );
        Ok(hits)
    }

    /// Return the `k` best documents for `query_text` under a weighted
    /// combination of semantic and lexical relevance.
    ///
    /// The semantic stage over-fetches `overfetch_factor * k` candidates
    /// via [`search_similar`](QueryEngine::search_similar); each candidate
    /// is then scored lexically by lowercase whitespace token overlap
    /// (no stemming, no stop words):
    ///
    /// ```text
    /// keyword  = |query_tokens ∩ doc_tokens| / |query_tokens|
    /// semantic = clamp(1 - distance, 0, 1)
    /// combined = (1 - keyword_weight) * semantic + keyword_weight * keyword
    /// ```
    ///
    /// Results are sorted descending by combined score (ties broken by id
    /// ascending) and truncated to `k`. Omitted `k`/`keyword_weight` fall
    /// back to the configured `default_top_k` and `default_keyword_weight`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when `keyword_weight` lies
    /// outside [0, 1].
    pub async fn hybrid_search(
        &self,
        collection: &str,
        query_text: &str,
        k: Option<usize>,
        keyword_weight: Option<f32>,
    ) -> Result<Vec<HybridHit>> {
        let k = k.unwrap_or(self.store.config().default_top_k);
        let keyword_weight =
            keyword_weight.unwrap_or(self.store.config().default_keyword_weight);
        if !(0.0..=1.0).contains(&keyword_weight) {
            return Err(StoreError::InvalidArgument(format!(
                "keyword_weight ({keyword_weight}) must be within [0, 1]"
            )));
        }

        let overfetch = self.store.config().overfetch_factor * k;
        let candidates =
            self.search_similar(collection, query_text, Some(overfetch), None).await?;
        debug!(collection, candidates = candidates.len(), overfetch, "re-ranking candidates");

        let query_tokens = tokenize(query_text);
        let mut hits: Vec<HybridHit> = candidates
            .into_iter()
            .map(|hit| {
                let keyword_score = keyword_overlap(&query_tokens, &hit.text);
                // Cosine distance reaches 2 for opposed vectors; clamp so
                // the combination stays in [0, 1] for any metric.
                let semantic_score = (1.0 - hit.distance).clamp(0.0, 1.0);
                let combined_score = (1.0 - keyword_weight) * semantic_score
                    + keyword_weight * keyword_score;
                HybridHit {
                    id: hit.id,
                    text: hit.text,
                    combined_score,
                    semantic_score,
                    keyword_score,
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);

        info!(collection, k, keyword_weight, result_count = hits.len(), "hybrid search completed");
        Ok(hits)
    }

    /// Run each query through [`search_similar`](QueryEngine::search_similar)
    /// and report per-query latency plus min/max/average across the batch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when `queries` is empty, and
    /// propagates any search failure.
    pub async fn benchmark_search(
        &self,
        collection: &str,
        queries: &[&str],
        k: Option<usize>,
    ) -> Result<SearchBenchmark> {
        if queries.is_empty() {
            return Err(StoreError::InvalidArgument(
                "benchmark requires at least one query".into(),
            ));
        }

        let mut times = Vec::with_capacity(queries.len());
        for query in queries {
            let started = Instant::now();
            self.search_similar(collection, query, k, None).await?;
            times.push(started.elapsed());
        }

        let total: Duration = times.iter().sum();
        let min_time = times.iter().copied().min().unwrap_or_default();
        let max_time = times.iter().copied().max().unwrap_or_default();
        let average_time = total / times.len() as u32;

        info!(
            collection,
            query_count = queries.len(),
            average_ms = average_time.as_millis() as u64,
            "search benchmark completed"
        );
        Ok(SearchBenchmark { times, min_time, max_time, average_time })
    }
}

/// Latency summary produced by [`QueryEngine::benchmark_search`].
#[derive(Debug, Clone)]
pub struct SearchBenchmark {
    /// Per-query wall-clock search time, in query order.
    pub times: Vec<Duration>,
    /// Fastest single query.
    pub min_time: Duration,
    /// Slowest single query.
    pub max_time: Duration,
    /// Mean time across all queries.
    pub average_time: Duration,
}

/// Split text into a set of lowercase whitespace-delimited tokens.
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Fraction of query tokens present in `text`, or 0 for an empty query.
fn keyword_overlap(query_tokens: &HashSet<String>, text: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let doc_tokens = tokenize(text);
    let matches = query_tokens.intersection(&doc_tokens).count();
    matches as f32 / query_tokens.len() as f32
}
