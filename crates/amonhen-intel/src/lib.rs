pub mod anomalies;
pub mod clusterer;
pub mod density;
pub mod digest;
pub mod divergence;

pub use anomalies::{AnomalyDetector, AnomalyRecord};
pub use clusterer::{ClusterLabeler, Clusterer};
pub use digest::DigestGenerator;
pub use divergence::{DivergenceDetector, DivergenceRecord};
