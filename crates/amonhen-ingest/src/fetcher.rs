//! The fetch-adapter seam
//!
//! A closed set of four source families (RSS, GDELT, Bluesky, Reddit) per
//! [`amonhen_models::SourceFamily`] — adding a fifth is a deliberate change
//! to that enum, not a new trait implementor slotted in at runtime.
//! Concrete adapters are out of scope; this trait is the contract they
//! would satisfy.

use amonhen_core_types::Result;
use amonhen_models::RawItem;
use async_trait::async_trait;

/// Fetches raw items from one configured source
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Human-readable name of this source instance (e.g. a specific RSS feed
    /// URL or subreddit), used as the `source_name` on fetched items and as
    /// the key into `source_status`.
    fn source_name(&self) -> &str;

    /// Fetch whatever is new since the last call. Implementations are
    /// expected to be best-effort: a single malformed entry should be
    /// skipped, not fail the whole fetch.
    async fn fetch(&self) -> Result<Vec<RawItem>>;
}
