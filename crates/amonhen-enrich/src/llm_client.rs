//! Injected LLM transport seam
//!
//! The actual HTTP/SDK call (Anthropic Messages API, Ollama `/api/generate`)
//! is out of scope — this trait is what [`crate::provider::EnrichProvider`]
//! calls through, so the rest of the pipeline stays testable with a fake.

use amonhen_core_types::Result;
use async_trait::async_trait;

/// One model completion: raw text plus token usage for cost accounting
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A single conversational turn sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct LlmTurn {
    pub role: &'static str,
    pub content: String,
}

/// Transport for a multi-turn completion call
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, turns: &[LlmTurn]) -> Result<LlmResponse>;
}
