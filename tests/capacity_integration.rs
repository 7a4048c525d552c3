//! Integration tests for transfer size estimation.

mod support;

use cruise_lug::estimate_transfer_size;
use support::{MemoryStore, survey_store};

fn prefixes(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_estimate_empty_prefix_set_is_zero_without_listing() {
    let store = survey_store();
    let estimate = estimate_transfer_size(&store, &[]).await.unwrap();

    assert_eq!(estimate.total_bytes(), 0);
    assert_eq!(estimate.total_objects(), 0);
    assert!(store.list_calls().is_empty());
}

#[tokio::test]
async fn test_estimate_counts_nested_objects() {
    let store = survey_store();
    let estimate = estimate_transfer_size(&store, &prefixes(&["mb/shipA/platform1/survey_a/"]))
        .await
        .unwrap();

    assert_eq!(estimate.total_bytes(), 1300);
    assert_eq!(estimate.total_objects(), 2);
    assert_eq!(estimate.prefixes[0].prefix, "mb/shipA/platform1/survey_a/");
    // flat listing, no delimiter
    assert!(store.list_calls().iter().all(|call| call.delimiter.is_none()));
}

#[tokio::test]
async fn test_estimate_is_additive_over_disjoint_prefixes() {
    let a = "mb/shipA/platform1/survey_a/";
    let b = "mb/shipA/platform1/survey_b/";
    let store = survey_store();

    let only_a = estimate_transfer_size(&store, &prefixes(&[a])).await.unwrap();
    let only_b = estimate_transfer_size(&store, &prefixes(&[b])).await.unwrap();
    let both = estimate_transfer_size(&store, &prefixes(&[a, b])).await.unwrap();

    assert_eq!(
        both.total_bytes(),
        only_a.total_bytes() + only_b.total_bytes()
    );
    assert_eq!(both.prefixes.len(), 2);
    assert_eq!(both.prefixes[1].bytes, 200);
}

#[tokio::test]
async fn test_estimate_walks_every_page() {
    let mut store = MemoryStore::new();
    for i in 0..2500 {
        store = store.with_sized_object(&format!("mb/s/p/big/file{i:05}"), 2);
    }

    let estimate = estimate_transfer_size(&store, &prefixes(&["mb/s/p/big/"]))
        .await
        .unwrap();

    assert_eq!(estimate.total_objects(), 2500);
    assert_eq!(estimate.total_bytes(), 5000);
    assert_eq!(store.list_calls().len(), 3);
}

#[tokio::test]
async fn test_estimate_listing_failure_aborts() {
    let store = survey_store().failing_list_on("mb/shipA/platform1/survey_b/");
    let err = estimate_transfer_size(
        &store,
        &prefixes(&["mb/shipA/platform1/survey_a/", "mb/shipA/platform1/survey_b/"]),
    )
    .await
    .unwrap_err();

    assert!(err.is_listing());
}
