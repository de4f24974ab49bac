pub mod settings;
pub mod sources;

pub use settings::{ClusteringConfig, EnrichmentConfig, Settings, VectorBackendMode};
pub use sources::{
    BlueskyConfig, GdeltConfig, GdeltQueryConfig, RedditConfig, RedditSubredditConfig,
    RssSourceConfig, SourcesConfig,
};
