//! Stand-in LLM client for CLI-driven commands
//!
//! No Anthropic/Ollama transport lives in this workspace (out of scope
//! per the enrichment crate's design note) so `cluster`/`digest` always
//! run against a client that fails every call, exercising the fallback
//! label/digest paths deterministically.

use amonhen_core_types::{AmError, AmErrorKind, Result};
use amonhen_enrich::{LlmClient, LlmResponse, LlmTurn};
use async_trait::async_trait;

pub struct NoOpLlmClient;

#[async_trait]
impl LlmClient for NoOpLlmClient {
    async fn complete(&self, _turns: &[LlmTurn]) -> Result<LlmResponse> {
        Err(AmError::new(AmErrorKind::LlmFailed)
            .with_op("cli_noop_client")
            .with_message("no LLM transport configured for this CLI build"))
    }
}
