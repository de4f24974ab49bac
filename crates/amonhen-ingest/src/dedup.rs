//! Pre-enrichment deduplication
//!
//! Grounded on `sources/__init__.py::deduplicate`: a pure filter over
//! already-fetched items, checking each `canonical_url` against the
//! MetaStore. Idempotent — running it twice over the same input and store
//! state yields the same result.

use amonhen_core_types::Result;
use amonhen_models::RawItem;
use amonhen_store::MetaStore;

/// Filter out items whose `canonical_url` already exists in `store`
pub fn deduplicate(items: Vec<RawItem>, store: &MetaStore) -> Result<Vec<RawItem>> {
    let mut new_items = Vec::with_capacity(items.len());
    for item in items {
        if !store.item_url_exists(&item.canonical_url)? {
            new_items.push(item);
        }
    }
    Ok(new_items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amonhen_models::SourceFamily;
    use chrono::Utc;

    fn item(url: &str) -> RawItem {
        RawItem::new(SourceFamily::Rss, "bbc-world", url, "content", Utc::now())
    }

    #[test]
    fn filters_out_known_urls_only() {
        let store = MetaStore::open_in_memory().unwrap();
        let items = vec![item("https://example.com/a"), item("https://example.com/b")];
        let first_pass = deduplicate(items, &store).unwrap();
        assert_eq!(first_pass.len(), 2);
    }

    #[test]
    fn is_idempotent_once_items_are_persisted() {
        use amonhen_models::EnrichedItem;

        let store = MetaStore::open_in_memory().unwrap();
        let raw = item("https://example.com/dup");
        let enriched = EnrichedItem {
            id: raw.id.clone(),
            source_family: raw.source_family,
            source_name: raw.source_name.clone(),
            canonical_url: raw.canonical_url.clone(),
            title: None,
            published_at: raw.published_at,
            ingested_at: raw.ingested_at,
            language: raw.language.clone(),
            summary: "s".to_string(),
            entities: vec![],
            claims: vec![],
            framing: "f".to_string(),
            sentiment: 0.0,
            topic_tags: vec![],
            embedding_id: raw.id.clone(),
            embedding_model: "m".to_string(),
            cluster_id: None,
            cluster_label: None,
            enrichment_model: "m".to_string(),
            enrichment_cost_usd: 0.0,
            archived: false,
        };
        store.insert_item(&enriched).unwrap();

        let refetched = vec![item("https://example.com/dup")];
        let result = deduplicate(refetched, &store).unwrap();
        assert!(result.is_empty());
    }
}
