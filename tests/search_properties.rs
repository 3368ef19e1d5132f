//! Property tests for search ordering and hybrid score bounds.

mod common;

use std::collections::HashMap;

use proptest::prelude::*;
use vecdoc::{Document, InMemoryBackend, Metadata, QueryEngine, StorageBackend};

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate a document with a normalized embedding and no metadata.
fn arb_document(dim: usize) -> impl Strategy<Value = Document> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Document { id, text, embedding, metadata: Metadata::new() },
    )
}

mod prop_nearest_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any stored documents and query embedding, `nearest` returns
        /// at most `k` results ordered ascending by distance, with ties
        /// broken by ascending id.
        #[test]
        fn results_ascend_by_distance_and_are_bounded_by_k(
            documents in proptest::collection::vec(arb_document(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let backend = InMemoryBackend::new();
                backend.create_collection("test").await.unwrap();

                // Deduplicate by id so upsert overwrites don't shrink the set.
                let mut deduped: HashMap<String, Document> = HashMap::new();
                for document in &documents {
                    deduped.entry(document.id.clone()).or_insert_with(|| document.clone());
                }
                let unique: Vec<Document> = deduped.into_values().collect();
                let count = unique.len();

                backend.upsert("test", &unique).await.unwrap();
                let results = backend.nearest("test", &query, k, None).await.unwrap();
                (results, count)
            });

            prop_assert!(results.len() <= k);
            prop_assert!(results.len() <= unique_count);

            for window in results.windows(2) {
                prop_assert!(
                    window[0].1 < window[1].1
                        || (window[0].1 == window[1].1 && window[0].0 < window[1].0),
                    "results out of order: {:?} then {:?}",
                    window[0],
                    window[1],
                );
            }
        }
    }
}

mod prop_hybrid_bounds {
    use super::*;
    use crate::common::trigram_store;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// For any corpus, query, and weight in [0, 1], hybrid scores lie
        /// in [0, 1], results descend by combined score, and at most `k`
        /// come back.
        #[test]
        fn combined_scores_lie_in_the_unit_interval(
            texts in proptest::collection::vec("[a-z]{2,8}( [a-z]{2,8}){0,5}", 1..12),
            query in "[a-z]{2,8}( [a-z]{2,8}){0,3}",
            weight in 0.0f32..=1.0f32,
            k in 1usize..8,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let hits = rt.block_on(async {
                let (store, _) = trigram_store();
                let texts: Vec<String> = texts;
                store.add_batch("props", &texts, None, None).await.unwrap();
                let engine = QueryEngine::new(store);
                engine.hybrid_search("props", &query, Some(k), Some(weight)).await.unwrap()
            });

            prop_assert!(hits.len() <= k);
            for hit in &hits {
                prop_assert!((0.0..=1.0).contains(&hit.semantic_score));
                prop_assert!((0.0..=1.0).contains(&hit.keyword_score));
                // One ulp of slack: the weighted sum can round just past 1.
                prop_assert!(hit.combined_score >= 0.0 && hit.combined_score <= 1.0 + 1e-6);
            }
            for window in hits.windows(2) {
                prop_assert!(window[0].combined_score >= window[1].combined_score);
            }
        }
    }
}
