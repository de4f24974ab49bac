//! Parsing of LLM enrichment output
//!
//! Grounded on the original `enrichment/llm.py::_strip_code_fences` /
//! `_parse_enrichment_json`: tolerant of surrounding markdown code fences,
//! drops individual entities with unknown `type`/`role` rather than
//! failing the whole record, clamps sentiment into range, and defaults
//! missing optional list fields to empty.

use std::str::FromStr;

use serde::Deserialize;

use crate::model::cluster::SentimentDistribution;
use crate::model::enums::{EntityRole, EntityType};
use crate::model::item::{Entity, EnrichmentResult};

/// Strip a leading/trailing markdown code fence (```` ```json\n ... \n``` ````)
/// from raw LLM text. Idempotent: stripping an already-stripped string is a
/// no-op.
pub fn strip_code_fences(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Skip an optional language tag up to the first newline.
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        s = rest.strip_prefix('\n').unwrap_or(rest);
    }
    let s = s.trim_end();
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim().to_string()
}

#[derive(Debug, Deserialize, Default)]
struct RawEntity {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    role: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawEnrichment {
    summary: Option<String>,
    #[serde(default)]
    entities: Vec<RawEntity>,
    #[serde(default)]
    claims: Vec<String>,
    framing: Option<String>,
    sentiment: Option<f64>,
    #[serde(default)]
    topic_tags: Vec<String>,
}

/// Parse raw LLM text (possibly fenced) into an [`EnrichmentResult`].
///
/// Returns `Err` only when the text is not valid JSON, or the top-level
/// `summary`/`framing`/`sentiment` fields are entirely absent — matching
/// the retry trigger described in the Enricher contract. Entities with an
/// unrecognized `type`/`role` are dropped individually; their siblings are
/// retained.
pub fn parse_enrichment_json(raw: &str) -> Result<EnrichmentResult, String> {
    let cleaned = strip_code_fences(raw);
    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| format!("invalid JSON: {e}"))?;

    let raw: RawEnrichment =
        serde_json::from_value(value).map_err(|e| format!("invalid enrichment shape: {e}"))?;

    let summary = raw.summary.ok_or("missing required field 'summary'")?;
    let framing = raw.framing.ok_or("missing required field 'framing'")?;
    let sentiment = raw.sentiment.ok_or("missing required field 'sentiment'")?;

    let entities = raw
        .entities
        .into_iter()
        .filter_map(|e| {
            let name = e.name?;
            let kind = EntityType::from_str(e.kind.as_deref().unwrap_or("person")).ok()?;
            let role = EntityRole::from_str(e.role.as_deref().unwrap_or("mentioned")).ok()?;
            Some(Entity {
                name,
                kind,
                role,
                aliases: e.aliases,
            })
        })
        .collect();

    Ok(EnrichmentResult {
        summary,
        entities,
        claims: raw.claims,
        framing,
        sentiment: clamp_sentiment(sentiment),
        topic_tags: raw.topic_tags,
    })
}

/// Clamp a raw sentiment value into `[-1.0, 1.0]`.
pub fn clamp_sentiment(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Bin sentiment values into the five canonical buckets.
///
/// Boundaries are half-open on the low side, closed on the high side:
/// `very_negative <= -0.6 < negative <= -0.2 < neutral <= 0.2 < positive
/// <= 0.6 < very_positive`.
pub fn bin_sentiment(values: &[f64]) -> SentimentDistribution {
    let mut bins = SentimentDistribution::default();
    for &v in values {
        if v <= -0.6 {
            bins.very_negative += 1;
        } else if v <= -0.2 {
            bins.negative += 1;
        } else if v <= 0.2 {
            bins.neutral += 1;
        } else if v <= 0.6 {
            bins.positive += 1;
        } else {
            bins.very_positive += 1;
        }
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_code_fences_is_idempotent() {
        let fenced = "```json\n{\"a\": 1}\n```";
        let once = strip_code_fences(fenced);
        let twice = strip_code_fences(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "{\"a\": 1}");
    }

    #[test]
    fn strip_code_fences_without_language_tag() {
        let fenced = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");
    }

    #[test]
    fn parses_well_formed_enrichment() {
        let raw = r#"{
            "summary": "A city council votes on a new park.",
            "entities": [
                {"name": "City Council", "type": "org", "role": "subject", "aliases": []}
            ],
            "claims": ["The vote passed 5-2."],
            "framing": "civic process framing",
            "sentiment": 0.2,
            "topic_tags": ["local-politics"]
        }"#;
        let result = parse_enrichment_json(raw).unwrap();
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.sentiment, 0.2);
    }

    #[test]
    fn drops_entity_with_unknown_type_but_keeps_siblings() {
        let raw = r#"{
            "summary": "s",
            "entities": [
                {"name": "Bad", "type": "alien", "role": "subject", "aliases": []},
                {"name": "Good", "type": "person", "role": "mentioned", "aliases": []}
            ],
            "claims": [],
            "framing": "f",
            "sentiment": 0.0,
            "topic_tags": []
        }"#;
        let result = parse_enrichment_json(raw).unwrap();
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].name, "Good");
    }

    #[test]
    fn sentiment_is_clamped() {
        assert_eq!(clamp_sentiment(5.0), 1.0);
        assert_eq!(clamp_sentiment(-5.0), -1.0);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let raw = r#"{"entities": [], "claims": [], "topic_tags": []}"#;
        assert!(parse_enrichment_json(raw).is_err());
    }

    #[test]
    fn bin_sentiment_matches_spec_example() {
        let values = [-0.9, -0.5, -0.1, 0.0, 0.1, 0.4, 0.8];
        let bins = bin_sentiment(&values);
        assert_eq!(bins.very_negative, 1);
        assert_eq!(bins.negative, 1);
        assert_eq!(bins.neutral, 3);
        assert_eq!(bins.positive, 1);
        assert_eq!(bins.very_positive, 1);
    }
}
