pub mod cluster;
pub mod enums;
pub mod item;
pub mod metadata;
pub mod ops;

pub use cluster::{ClusterMembership, NarrativeCluster, SentimentDistribution};
pub use enums::{ClusterStatus, EntityRole, EntityType, SourceFamily};
pub use item::{EnrichedItem, Entity, EnrichmentResult, RawItem};
pub use metadata::Metadata;
pub use ops::{CostLogEntry, DailyDigest, SourceHealth};
