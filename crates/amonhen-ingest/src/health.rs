//! Per-source-family fetch health bookkeeping
//!
//! Grounded on `run_ingestion`'s per-family `SourceStatus` updates: one row
//! written per family per ingestion cycle, whether the fetch succeeded or
//! failed.

use amonhen_models::{SourceFamily, SourceHealth};
use amonhen_store::MetaStore;
use chrono::{DateTime, Utc};

/// Record the outcome of one family's fetch attempt for this cycle
pub fn record_fetch_outcome(
    store: &MetaStore,
    source_name: &str,
    source_family: SourceFamily,
    now: DateTime<Utc>,
    outcome: Result<usize, String>,
) -> amonhen_core_types::Result<()> {
    let health = match outcome {
        Ok(items_fetched) => SourceHealth {
            source_name: source_name.to_string(),
            source_family,
            last_fetch_at: Some(now),
            last_success_at: Some(now),
            items_fetched: items_fetched as u64,
            error_count: 0,
            last_error: None,
        },
        Err(reason) => SourceHealth {
            source_name: source_name.to_string(),
            source_family,
            last_fetch_at: Some(now),
            last_success_at: None,
            items_fetched: 0,
            error_count: 1,
            last_error: Some(reason),
        },
    };
    store.upsert_source_health(&health)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_sets_both_timestamps() {
        let store = MetaStore::open_in_memory().unwrap();
        let now = Utc::now();
        record_fetch_outcome(&store, "bbc-world", SourceFamily::Rss, now, Ok(12)).unwrap();

        let all = store.get_all_source_health().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].items_fetched, 12);
        assert_eq!(all[0].error_count, 0);
    }

    #[test]
    fn failure_leaves_last_success_at_alone_on_first_run() {
        let store = MetaStore::open_in_memory().unwrap();
        let now = Utc::now();
        record_fetch_outcome(
            &store,
            "gdelt",
            SourceFamily::Gdelt,
            now,
            Err("timeout".to_string()),
        )
        .unwrap();

        let all = store.get_all_source_health().unwrap();
        assert_eq!(all[0].error_count, 1);
        assert!(all[0].last_success_at.is_none());
        assert_eq!(all[0].last_error.as_deref(), Some("timeout"));
    }
}
