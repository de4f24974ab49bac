use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque per-source metadata carried alongside a `RawItem`, passed
/// through to storage untouched by the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Metadata {
    data: HashMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }
}
