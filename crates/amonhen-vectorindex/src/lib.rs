//! Embedded single-node VectorIndex: the other half of the dual-store
//! substrate
//!
//! A fixed-dimension, cosine-distance vector collection held in process
//! memory behind an `RwLock`, with an explicit JSON snapshot
//! (`open`/`save`) a caller can use to persist it across process
//! restarts. See [`store::VectorIndex`] for the full operation surface.

pub mod cosine;
pub mod store;

pub use cosine::{cosine_distance, cosine_similarity};
pub use store::{CollectionInfo, PointFilter, ScoredPoint, VectorIndex, COLLECTION_NAME, VECTOR_SIZE};
