//! Prompt templates sent to the LLM provider
//!
//! Verbatim from `enrichment/llm.py::ENRICHMENT_PROMPT`.

/// Raw item content is truncated to this many characters before prompting
pub const MAX_CONTENT_CHARS: usize = 4000;

const ENRICHMENT_PROMPT_TEMPLATE: &str = r#"Analyze the following news/social media content and extract structured intelligence.

CONTENT:
{content}

Respond with a JSON object containing exactly these fields:
{
  "summary": "2-3 sentence summary of the key narrative",
  "entities": [
    {"name": "entity name", "type": "person|org|place|event", "role": "subject|target|source|location|mentioned", "aliases": []}
  ],
  "claims": ["list of factual claims or assertions made"],
  "framing": "how the narrative is framed (e.g., 'crisis framing', 'progress narrative', 'conflict framing')",
  "sentiment": 0.0,
  "topic_tags": ["relevant", "topic", "tags"]
}

Rules:
- sentiment must be a float between -1.0 (very negative) and 1.0 (very positive)
- Include 1-5 entities with accurate types and roles
- Include 1-5 claims that are specific assertions from the content
- Respond with ONLY the JSON object, no other text"#;

/// Build the enrichment prompt for a single item's (already-truncated) content
pub fn build_enrichment_prompt(content: &str) -> String {
    ENRICHMENT_PROMPT_TEMPLATE.replace("{content}", content)
}

/// Retry instruction appended as a follow-up user turn when the first
/// response fails to parse as valid enrichment JSON
pub const RETRY_INSTRUCTION: &str =
    "Your response was not valid JSON. Please respond with ONLY a valid JSON object.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_content_into_template() {
        let prompt = build_enrichment_prompt("a flood hit the city");
        assert!(prompt.contains("a flood hit the city"));
        assert!(prompt.contains("\"summary\""));
    }
}
