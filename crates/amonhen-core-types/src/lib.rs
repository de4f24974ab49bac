//! Foundational types shared across the narrative-intelligence pipeline
//!
//! - **error**: the canonical `AmError`/`AmErrorKind` structured error type
//! - **telemetry**: tracing subscriber init, operation-boundary log macros,
//!   and a test-capture subscriber

pub mod error;
pub mod telemetry;

pub use error::{AmError, AmErrorKind, Result};
