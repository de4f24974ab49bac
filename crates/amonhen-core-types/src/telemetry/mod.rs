//! Structured logging facility shared by every pipeline crate
//!
//! Provides a single initialization point (`init(profile)`), structured
//! operation-boundary macros (`log_op_start!`, `log_op_end!`,
//! `log_op_error!`), and a test-capture subscriber for asserting on emitted
//! events without parsing stdout.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
