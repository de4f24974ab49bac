//! Logging initialization
//!
//! Provides a single initialization point for the tracing subscriber. Call
//! once at process startup (the CLI does this before dispatching any
//! subcommand).

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for local development
    Development,
    /// JSON structured output for scheduled/production runs
    Production,
    /// Capture mode for deterministic test assertions
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the tracing subscriber for the given profile. Idempotent —
/// later calls are no-ops.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("amonhen=debug")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("amonhen=info")),
                )
                .init();
        }
        Profile::Test => {
            // Test capture is wired up separately via init_test_capture()
            tracing_subscriber::registry().init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn profile_equality() {
        assert_eq!(Profile::Development, Profile::Development);
        assert_ne!(Profile::Development, Profile::Production);
    }
}
