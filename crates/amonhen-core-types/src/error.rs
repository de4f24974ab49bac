//! Structured error type shared across the narrative-intelligence pipeline
//!
//! Every fallible operation in the pipeline returns `Result<T>` with this
//! error type rather than leaking a storage- or library-specific error.
//! Each kind maps to a stable error code so the (out-of-core) read API can
//! surface consistent error bodies.

use thiserror::Error;

/// Result type alias used throughout the pipeline crates
pub type Result<T> = std::result::Result<T, AmError>;

/// Canonical error kind taxonomy for the narrative-intelligence pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmErrorKind {
    /// Canonical URL already present (dedup key violation)
    DuplicateUrl,
    /// Requested row does not exist
    NotFound,
    /// Caller-supplied value fails validation
    InvalidInput,
    /// Daily spend cap reached; item skipped, not a hard failure
    BudgetExceeded,
    /// The LLM call itself failed (network, 5xx, timeout)
    LlmFailed,
    /// LLM output could not be parsed as valid enrichment JSON, after retry
    ParseFailed,
    /// Embedding call failed
    EmbedFailed,
    /// Storage-layer failure (SQLite, vector index)
    Persistence,
    /// Filesystem/IO failure
    Io,
    /// (De)serialization failure
    Serialization,
    /// Anything that doesn't fit the above
    Internal,
}

impl AmErrorKind {
    /// Stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            AmErrorKind::DuplicateUrl => "ERR_DUPLICATE_URL",
            AmErrorKind::NotFound => "ERR_NOT_FOUND",
            AmErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            AmErrorKind::BudgetExceeded => "ERR_BUDGET_EXCEEDED",
            AmErrorKind::LlmFailed => "ERR_LLM_FAILED",
            AmErrorKind::ParseFailed => "ERR_PARSE_FAILED",
            AmErrorKind::EmbedFailed => "ERR_EMBED_FAILED",
            AmErrorKind::Persistence => "ERR_PERSISTENCE",
            AmErrorKind::Io => "ERR_IO",
            AmErrorKind::Serialization => "ERR_SERIALIZATION",
            AmErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone, Error)]
#[error("{}", self.render())]
pub struct AmError {
    kind: AmErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    #[source]
    source: Option<Box<AmError>>,
}

impl AmError {
    /// Create a new error with the given kind
    pub fn new(kind: AmErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Attach operation context (e.g. "insert_item")
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Attach entity id context (item id, cluster id, ...)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Attach a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Chain an underlying error
    pub fn with_source(mut self, source: AmError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> AmErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn render(&self) -> String {
        let mut s = format!("[{}]", self.kind.code());
        if let Some(op) = &self.op {
            s.push_str(&format!(" in operation '{}'", op));
        }
        if !self.message.is_empty() {
            s.push_str(&format!(": {}", self.message));
        }
        if let Some(id) = &self.entity_id {
            s.push_str(&format!(" (entity_id: {})", id));
        }
        s
    }
}

/// Build a [`AmError`] from a [`std::io::Error`]
pub fn io_error(operation: &str, err: std::io::Error) -> AmError {
    AmError::new(AmErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Build a budget-exceeded error (used for logging; the Enricher treats
/// this as a skip, not a propagated failure — see `amonhen-enrich`)
pub fn budget_exceeded(item_id: &str, daily_cost: f64, cap: f64) -> AmError {
    AmError::new(AmErrorKind::BudgetExceeded)
        .with_op("enrich")
        .with_entity_id(item_id)
        .with_message(format!(
            "daily budget ${cap:.2} exceeded (${daily_cost:.4} spent)"
        ))
}

/// Build a parse-failed error after the single retry has also failed
pub fn parse_failed(item_id: &str, reason: impl Into<String>) -> AmError {
    AmError::new(AmErrorKind::ParseFailed)
        .with_op("enrich")
        .with_entity_id(item_id)
        .with_message(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_url_has_stable_code() {
        let err = AmError::new(AmErrorKind::DuplicateUrl)
            .with_op("insert_item")
            .with_message("https://example.com/a already exists");
        assert_eq!(err.code(), "ERR_DUPLICATE_URL");
        assert_eq!(err.op(), Some("insert_item"));
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = AmError::new(AmErrorKind::NotFound).with_message("item x not found");
        let rendered = err.to_string();
        assert!(rendered.contains("ERR_NOT_FOUND"));
        assert!(rendered.contains("item x not found"));
    }
}
