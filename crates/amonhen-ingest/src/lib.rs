//! Source ingestion contract
//!
//! No concrete source adapters are implemented here — RSS/GDELT/Bluesky/
//! Reddit fetch logic is out of scope. This crate is the seam between
//! fetch and enrich: the [`SourceFetcher`] trait concrete adapters would
//! implement, the dedup pass, and per-family health bookkeeping.

pub mod dedup;
pub mod fetcher;
pub mod health;

pub use dedup::deduplicate;
pub use fetcher::SourceFetcher;
pub use health::record_fetch_outcome;
