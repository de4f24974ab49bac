//! LLM provider as a closed sum type
//!
//! Grounded on `enrichment/llm.py`'s two concrete `LLMProvider`
//! implementations. A closed `enum` rather than an open trait-object
//! hierarchy, per the design note against dynamic dispatch for source
//! families/providers — a third provider is a deliberate enum change.

use amonhen_core_types::{AmError, AmErrorKind, Result};
use amonhen_models::{parse_enrichment_json, CostLogEntry, EnrichmentResult, RawItem};

use crate::llm_client::{LlmClient, LlmTurn};
use crate::prompts::{build_enrichment_prompt, RETRY_INSTRUCTION, MAX_CONTENT_CHARS};

/// The LLM enrichment provider backing a single [`crate::enricher::Enricher`]
#[derive(Debug, Clone)]
pub enum EnrichProvider {
    /// A metered remote API, billed per input/output token
    Remote {
        model: String,
        input_cost_per_token: f64,
        output_cost_per_token: f64,
    },
    /// A self-hosted model behind an HTTP endpoint, zero marginal cost
    Local { base_url: String, model: String },
}

impl EnrichProvider {
    pub fn model_name(&self) -> &str {
        match self {
            EnrichProvider::Remote { model, .. } => model,
            EnrichProvider::Local { model, .. } => model,
        }
    }

    /// Run one enrichment call against `content_text`, parsing the result
    /// and retrying once on malformed JSON. `source_item_id` is used only
    /// for error/cost attribution — callers may pass a synthetic id for
    /// non-item prompts (cluster labeling, digest generation).
    pub async fn enrich_text(
        &self,
        source_item_id: &str,
        content_text: &str,
        client: &dyn LlmClient,
    ) -> Result<(EnrichmentResult, CostLogEntry)> {
        let truncated: String = content_text.chars().take(MAX_CONTENT_CHARS).collect();
        let prompt = build_enrichment_prompt(&truncated);

        let first_turn = LlmTurn {
            role: "user",
            content: prompt.clone(),
        };
        let response = client.complete(&[first_turn.clone()]).await?;

        let mut input_tokens = response.input_tokens;
        let mut output_tokens = response.output_tokens;

        let result = match parse_enrichment_json(&response.text) {
            Ok(result) => result,
            Err(_) => {
                let retry_turns = vec![
                    first_turn,
                    LlmTurn {
                        role: "assistant",
                        content: response.text.clone(),
                    },
                    LlmTurn {
                        role: "user",
                        content: RETRY_INSTRUCTION.to_string(),
                    },
                ];
                let retry_response = client.complete(&retry_turns).await?;
                input_tokens += retry_response.input_tokens;
                output_tokens += retry_response.output_tokens;
                parse_enrichment_json(&retry_response.text)
                    .map_err(|reason| parse_failed_error(source_item_id, reason))?
            }
        };

        let cost_usd = self.cost_for(input_tokens, output_tokens);
        let cost_entry = CostLogEntry {
            item_id: source_item_id.to_string(),
            model: self.model_name().to_string(),
            input_tokens,
            output_tokens,
            cost_usd,
            timestamp: chrono::Utc::now(),
        };

        Ok((result, cost_entry))
    }

    /// Convenience wrapper taking a [`RawItem`] directly
    pub async fn enrich(
        &self,
        item: &RawItem,
        client: &dyn LlmClient,
    ) -> Result<(EnrichmentResult, CostLogEntry)> {
        self.enrich_text(&item.id, &item.content_text, client).await
    }

    fn cost_for(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        match self {
            EnrichProvider::Remote {
                input_cost_per_token,
                output_cost_per_token,
                ..
            } => {
                input_tokens as f64 * input_cost_per_token
                    + output_tokens as f64 * output_cost_per_token
            }
            EnrichProvider::Local { .. } => 0.0,
        }
    }
}

fn parse_failed_error(item_id: &str, reason: impl Into<String>) -> AmError {
    AmError::new(AmErrorKind::ParseFailed)
        .with_op("enrich")
        .with_entity_id(item_id)
        .with_message(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedClient {
        responses: Mutex<Vec<LlmResponse>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _turns: &[LlmTurn]) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.remove(0))
        }
    }

    fn valid_json() -> String {
        r#"{"summary": "s", "entities": [], "claims": [], "framing": "f", "sentiment": 0.2, "topic_tags": []}"#.to_string()
    }

    #[tokio::test]
    async fn remote_provider_computes_cost_from_token_counts() {
        let client = ScriptedClient {
            responses: Mutex::new(vec![LlmResponse {
                text: valid_json(),
                input_tokens: 100,
                output_tokens: 50,
            }]),
            calls: AtomicUsize::new(0),
        };
        let provider = EnrichProvider::Remote {
            model: "claude-haiku".to_string(),
            input_cost_per_token: 0.80 / 1_000_000.0,
            output_cost_per_token: 4.00 / 1_000_000.0,
        };

        let (result, cost) = provider
            .enrich_text("item-1", "some content", &client)
            .await
            .unwrap();

        assert_eq!(result.sentiment, 0.2);
        let expected = 100.0 * (0.80 / 1_000_000.0) + 50.0 * (4.00 / 1_000_000.0);
        assert!((cost.cost_usd - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn local_provider_is_zero_cost() {
        let client = ScriptedClient {
            responses: Mutex::new(vec![LlmResponse {
                text: valid_json(),
                input_tokens: 0,
                output_tokens: 0,
            }]),
            calls: AtomicUsize::new(0),
        };
        let provider = EnrichProvider::Local {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
        };

        let (_, cost) = provider.enrich_text("item-1", "x", &client).await.unwrap();
        assert_eq!(cost.cost_usd, 0.0);
    }

    #[tokio::test]
    async fn retries_once_on_malformed_json_then_succeeds() {
        let client = ScriptedClient {
            responses: Mutex::new(vec![
                LlmResponse {
                    text: "not json".to_string(),
                    input_tokens: 10,
                    output_tokens: 5,
                },
                LlmResponse {
                    text: valid_json(),
                    input_tokens: 15,
                    output_tokens: 6,
                },
            ]),
            calls: AtomicUsize::new(0),
        };
        let provider = EnrichProvider::Local {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
        };

        let (result, cost) = provider.enrich_text("item-1", "x", &client).await.unwrap();
        assert_eq!(result.summary, "s");
        assert_eq!(cost.input_tokens, 25);
        assert_eq!(cost.output_tokens, 11);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fails_with_parse_failed_after_exhausting_retry() {
        let client = ScriptedClient {
            responses: Mutex::new(vec![
                LlmResponse {
                    text: "not json".to_string(),
                    input_tokens: 1,
                    output_tokens: 1,
                },
                LlmResponse {
                    text: "still not json".to_string(),
                    input_tokens: 1,
                    output_tokens: 1,
                },
            ]),
            calls: AtomicUsize::new(0),
        };
        let provider = EnrichProvider::Local {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
        };

        let err = provider.enrich_text("item-1", "x", &client).await.unwrap_err();
        assert_eq!(err.kind(), amonhen_core_types::AmErrorKind::ParseFailed);
    }
}
