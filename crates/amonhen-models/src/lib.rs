//! Data model and pure parsing functions for the narrative-intelligence
//! pipeline
//!
//! - **model**: RawItem, EnrichedItem, NarrativeCluster and the other
//!   structures persisted by the MetaStore/VectorIndex
//! - **parse**: tolerant LLM output parsing and sentiment binning

pub mod model;
pub mod parse;

pub use model::{
    ClusterMembership, ClusterStatus, CostLogEntry, DailyDigest, EnrichedItem, Entity,
    EntityRole, EntityType, EnrichmentResult, Metadata, NarrativeCluster, RawItem,
    SentimentDistribution, SourceFamily, SourceHealth,
};
pub use parse::{bin_sentiment, clamp_sentiment, parse_enrichment_json, strip_code_fences};

use std::fmt;

/// A value failed to parse into one of this crate's closed enums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError(pub String);

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized enum value: {}", self.0)
    }
}

impl std::error::Error for ParseEnumError {}
