//! Enricher: the LLM + embedding pipeline stage
//!
//! Grounded on `enrichment/__init__.py::enrich_items`: a `tokio::sync::
//! Semaphore` bounds concurrent LLM calls, a per-item daily-budget check
//! runs before each call, and a failure at any step (budget, LLM, embed,
//! persist) causes that single item to be dropped from the output rather
//! than failing the batch.

use std::sync::Arc;

use amonhen_models::{EnrichedItem, RawItem};
use amonhen_store::MetaStore;
use amonhen_vectorindex::VectorIndex;
use chrono::Utc;
use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::embedder::Embedder;
use crate::llm_client::LlmClient;
use crate::provider::EnrichProvider;

/// Bounded-concurrency enrichment pipeline: LLM call -> embed -> persist
pub struct Enricher {
    provider: EnrichProvider,
    client: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    store: Arc<MetaStore>,
    vectors: Arc<VectorIndex>,
    concurrency: usize,
    daily_budget_usd: f64,
    track_costs: bool,
}

impl Enricher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: EnrichProvider,
        client: Arc<dyn LlmClient>,
        embedder: Arc<dyn Embedder>,
        store: Arc<MetaStore>,
        vectors: Arc<VectorIndex>,
        concurrency: usize,
        daily_budget_usd: f64,
        track_costs: bool,
    ) -> Self {
        Self {
            provider,
            client,
            embedder,
            store,
            vectors,
            concurrency,
            daily_budget_usd,
            track_costs,
        }
    }

    /// Enrich a batch of raw items. Items that fail any step (budget
    /// exceeded, LLM failure, parse failure, embed failure, persistence
    /// failure) are silently dropped from the returned vector — this
    /// matches `asyncio.gather(..., return_exceptions=True)` plus the
    /// `None`-return-on-failure contract in the original.
    pub async fn enrich_items(&self, raw_items: Vec<RawItem>) -> Vec<EnrichedItem> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));
        let mut handles = Vec::with_capacity(raw_items.len());

        for item in raw_items {
            let semaphore = semaphore.clone();
            let enricher = self.clone_refs();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                enricher.process_one(item).await
            }));
        }

        let mut enriched = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Some(item)) => enriched.push(item),
                Ok(None) => {}
                Err(join_err) => error!(error = %join_err, "enrichment task panicked"),
            }
        }
        enriched
    }

    fn clone_refs(&self) -> EnricherRefs {
        EnricherRefs {
            provider: self.provider.clone(),
            client: self.client.clone(),
            embedder: self.embedder.clone(),
            store: self.store.clone(),
            vectors: self.vectors.clone(),
            daily_budget_usd: self.daily_budget_usd,
            track_costs: self.track_costs,
        }
    }
}

/// The subset of `Enricher` state needed inside a spawned task, cloned
/// per-item since `tokio::spawn` requires `'static` captures.
struct EnricherRefs {
    provider: EnrichProvider,
    client: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    store: Arc<MetaStore>,
    vectors: Arc<VectorIndex>,
    daily_budget_usd: f64,
    track_costs: bool,
}

impl EnricherRefs {
    async fn process_one(&self, item: RawItem) -> Option<EnrichedItem> {
        let today = Utc::now();
        let daily_cost = match self.store.daily_cost_usd(today) {
            Ok(cost) => cost,
            Err(e) => {
                error!(item_id = %item.id, error = %e, "failed to read daily cost");
                return None;
            }
        };
        if daily_cost >= self.daily_budget_usd {
            warn!(
                item_id = %item.id,
                daily_cost,
                cap = self.daily_budget_usd,
                "daily budget exceeded, skipping item"
            );
            return None;
        }

        let (result, cost_entry) = match self.provider.enrich(&item, self.client.as_ref()).await {
            Ok(pair) => pair,
            Err(e) => {
                error!(item_id = %item.id, error = %e, code = e.code(), "llm enrichment failed");
                return None;
            }
        };

        if self.track_costs {
            if let Err(e) = self.store.append_cost_log(&cost_entry) {
                error!(item_id = %item.id, error = %e, "failed to log cost");
                return None;
            }
        }

        let vector = match self.embedder.embed_enrichment(&result).await {
            Ok(vector) => vector,
            Err(e) => {
                error!(item_id = %item.id, error = %e, kind = ?e.kind(), "embedding failed");
                return None;
            }
        };

        let enriched_item = EnrichedItem {
            id: item.id.clone(),
            source_family: item.source_family,
            source_name: item.source_name.clone(),
            canonical_url: item.canonical_url.clone(),
            title: item.title.clone(),
            published_at: item.published_at,
            ingested_at: item.ingested_at,
            language: item.language.clone(),
            summary: result.summary,
            entities: result.entities,
            claims: result.claims,
            framing: result.framing,
            sentiment: result.sentiment,
            topic_tags: result.topic_tags,
            embedding_id: item.id.clone(),
            embedding_model: self.embedder.model_name().to_string(),
            cluster_id: None,
            cluster_label: None,
            enrichment_model: cost_entry.model.clone(),
            enrichment_cost_usd: cost_entry.cost_usd,
            archived: false,
        };

        if let Err(e) = self.store.insert_item(&enriched_item) {
            error!(item_id = %item.id, error = %e, "failed to persist enriched item");
            return None;
        }

        let payload = enriched_item.vector_payload();
        if let Err(e) = self.vectors.upsert_item(&item.id, vector, payload) {
            error!(item_id = %item.id, error = %e, "failed to upsert vector");
            return None;
        }

        Some(enriched_item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amonhen_core_types::{AmError, AmErrorKind};
    use amonhen_models::{Metadata, SourceFamily};
    use async_trait::async_trait;

    struct FixedLlmClient {
        text: String,
    }

    #[async_trait]
    impl LlmClient for FixedLlmClient {
        async fn complete(&self, _turns: &[LlmTurn]) -> amonhen_core_types::Result<LlmResponse> {
            Ok(LlmResponse {
                text: self.text.clone(),
                input_tokens: 10,
                output_tokens: 5,
            })
        }
    }

    struct FailingLlmClient;

    #[async_trait]
    impl LlmClient for FailingLlmClient {
        async fn complete(&self, _turns: &[LlmTurn]) -> amonhen_core_types::Result<LlmResponse> {
            Err(AmError::new(AmErrorKind::LlmFailed)
                .with_op("test_transport")
                .with_message("simulated transport failure"))
        }
    }

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        fn model_name(&self) -> &str {
            "fake-embedder"
        }

        async fn embed(&self, _text: &str) -> amonhen_core_types::Result<Vec<f32>> {
            Ok(vec![0.1; amonhen_vectorindex::VECTOR_SIZE])
        }
    }

    fn raw_item(id: &str) -> RawItem {
        RawItem {
            id: id.to_string(),
            source_family: SourceFamily::Rss,
            source_name: "test-feed".to_string(),
            canonical_url: format!("https://example.com/{id}"),
            title: Some("Title".to_string()),
            content_text: "Some article body.".to_string(),
            author: None,
            published_at: Utc::now(),
            ingested_at: Utc::now(),
            language: "en".to_string(),
            source_metadata: Metadata::new(),
        }
    }

    fn valid_enrichment_json() -> String {
        r#"{"summary":"s","entities":[],"claims":["c"],"framing":"f","sentiment":0.1,"topic_tags":["t"]}"#
            .to_string()
    }

    fn test_enricher(client: Arc<dyn LlmClient>) -> Enricher {
        Enricher::new(
            EnrichProvider::Local {
                base_url: "http://localhost".to_string(),
                model: "test-model".to_string(),
            },
            client,
            Arc::new(FakeEmbedder),
            Arc::new(MetaStore::open_in_memory().unwrap()),
            Arc::new(VectorIndex::new()),
            3,
            2.00,
            true,
        )
    }

    #[tokio::test]
    async fn successful_items_are_enriched_and_persisted() {
        let enricher = test_enricher(Arc::new(FixedLlmClient {
            text: valid_enrichment_json(),
        }));

        let result = enricher
            .enrich_items(vec![raw_item("a"), raw_item("b")])
            .await;

        assert_eq!(result.len(), 2);
        assert!(enricher.store.get_item("a").unwrap().is_some());
        assert!(enricher.store.get_item("b").unwrap().is_some());
    }

    #[tokio::test]
    async fn llm_failure_drops_the_item_without_failing_the_batch() {
        let enricher = test_enricher(Arc::new(FailingLlmClient));

        let result = enricher.enrich_items(vec![raw_item("a")]).await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn items_past_the_daily_budget_are_skipped() {
        let enricher = test_enricher(Arc::new(FixedLlmClient {
            text: valid_enrichment_json(),
        }));

        enricher
            .store
            .append_cost_log(&amonhen_models::CostLogEntry {
                item_id: "prior".to_string(),
                model: "test-model".to_string(),
                input_tokens: 0,
                output_tokens: 0,
                cost_usd: enricher.daily_budget_usd,
                timestamp: Utc::now(),
            })
            .unwrap();

        let result = enricher.enrich_items(vec![raw_item("a")]).await;

        assert!(result.is_empty());
        assert!(enricher.store.get_item("a").unwrap().is_none());
    }
}

