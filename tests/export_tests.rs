//! Export/import and statistics tests.

mod common;

use std::sync::Arc;

use common::{TrigramEmbedder, meta, store_with, trigram_store};
use vecdoc::{Exporter, InMemoryBackend, StatisticsCollector, StorageBackend};

const COLL: &str = "kb";

#[tokio::test]
async fn export_carries_the_portable_file_shape() {
    let (store, _) = trigram_store();
    store
        .add(COLL, "exported text", Some(meta(&[("category", "ai".into())])), Some("e1".into()))
        .await
        .unwrap();

    let exporter = Exporter::new(store);
    let export = exporter.export(COLL).await.unwrap();

    assert_eq!(export.collection_name, COLL);
    assert_eq!(export.total_documents, 1);
    assert_eq!(export.documents[0].id, "e1");
    assert_eq!(export.documents[0].text, "exported text");

    // Text serializes under the "document" key; embeddings never appear.
    let json = serde_json::to_value(&export).unwrap();
    let doc = &json["documents"][0];
    assert_eq!(doc["document"], "exported text");
    assert!(doc.get("embedding").is_none());
    assert!(json.get("export_timestamp").is_some());
}

#[tokio::test]
async fn file_round_trip_restores_text_and_metadata() {
    let (source, _) = trigram_store();
    source
        .add(COLL, "alpha document", Some(meta(&[("tag", "a".into())])), Some("d1".into()))
        .await
        .unwrap();
    source
        .add(COLL, "beta document", Some(meta(&[("tag", "b".into())])), Some("d2".into()))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kb_export.json");
    let exported = Exporter::new(source).export_to_json(COLL, &path).await.unwrap();
    assert_eq!(exported, 2);

    let (target, _) = trigram_store();
    let ids = Exporter::new(target.clone()).import_from_json(COLL, &path, Some(100)).await.unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(target.count(COLL).await.unwrap(), 2);

    let doc = target.get(COLL, "d1").await.unwrap().unwrap();
    assert_eq!(doc.text, "alpha document");
    assert_eq!(doc.metadata, meta(&[("tag", "a".into())]));
}

#[tokio::test]
async fn import_rederives_embeddings_with_the_target_provider() {
    let (source, _) = trigram_store();
    source.add(COLL, "some text", None, Some("d1".into())).await.unwrap();
    let export = Exporter::new(source).export(COLL).await.unwrap();

    // The target uses a narrower embedder; import must produce vectors of
    // the target's dimension, proving embeddings are re-derived.
    let backend = Arc::new(InMemoryBackend::new());
    let target = store_with(Arc::new(TrigramEmbedder::with_dim(16)), backend.clone());
    Exporter::new(target).import(COLL, export, Some(100)).await.unwrap();

    assert_eq!(backend.dimension(COLL).await.unwrap(), Some(16));
    assert_eq!(backend.get(COLL, "d1").await.unwrap().unwrap().embedding.len(), 16);
}

#[tokio::test]
async fn statistics_aggregate_metadata_fields_and_cardinalities() {
    let (store, _) = trigram_store();
    store
        .add(COLL, "a", Some(meta(&[("category", "ai".into()), ("level", 1i64.into())])), None)
        .await
        .unwrap();
    store
        .add(COLL, "b", Some(meta(&[("category", "ai".into()), ("level", 2i64.into())])), None)
        .await
        .unwrap();
    store.add(COLL, "c", Some(meta(&[("category", "data".into())])), None).await.unwrap();
    store.add(COLL, "d", None, None).await.unwrap();

    let stats = StatisticsCollector::new(store).statistics(COLL).await.unwrap();

    assert_eq!(stats.total_documents, 4);
    assert_eq!(stats.metadata_fields, vec!["category".to_string(), "level".to_string()]);
    assert_eq!(stats.metadata_unique_counts["category"], 2);
    // The document lacking "level" does not count toward its cardinality.
    assert_eq!(stats.metadata_unique_counts["level"], 2);
}

#[tokio::test]
async fn statistics_of_an_empty_collection_are_empty() {
    let (store, _) = trigram_store();
    store.get_or_create(COLL).await.unwrap();

    let stats = StatisticsCollector::new(store).statistics(COLL).await.unwrap();
    assert_eq!(stats.total_documents, 0);
    assert!(stats.metadata_fields.is_empty());
    assert!(stats.metadata_unique_counts.is_empty());
}
