//! Core runtime settings
//!
//! Grounded on `config.py::Settings`/`EnrichmentConfig`/`ClusteringConfig`.
//! Secrets and paths that were environment-variable-backed
//! (`pydantic_settings.BaseSettings`) are plain fields here, loaded from a
//! single YAML document — this pipeline has no env-var precedence layer
//! to replace `pydantic-settings` with, so the file is the one source of
//! truth and callers that need env overrides compose them before parsing.

use std::path::{Path, PathBuf};

use amonhen_core_types::{AmError, AmErrorKind, Result};
use serde::{Deserialize, Serialize};

/// Vector backend deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackendMode {
    Memory,
    Local,
    Cloud,
}

impl Default for VectorBackendMode {
    fn default() -> Self {
        VectorBackendMode::Local
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub provider: String,
    pub model: String,
    pub track_costs: bool,
    pub daily_budget_usd: f64,
    /// Bounded-concurrency cap on simultaneous LLM calls (`spec.md` §5)
    pub concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
            track_costs: true,
            daily_budget_usd: 2.00,
            concurrency: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub min_cluster_size: usize,
    /// sklearn convention: counts the point itself
    pub min_samples: usize,
    pub rolling_window_days: i64,
    pub divergence_threshold: f32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 5,
            min_samples: 4,
            rolling_window_days: 30,
            divergence_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub anthropic_api_key: String,
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub bluesky_handle: String,
    pub bluesky_app_password: String,

    pub data_dir: PathBuf,
    pub sources_yaml_path: PathBuf,
    pub sqlite_path: PathBuf,
    /// JSON snapshot path for `VectorIndex::open`/`save` — the
    /// process-local index has no other persistence.
    pub vector_index_path: PathBuf,

    pub vector_backend_mode: VectorBackendMode,

    pub enrichment: EnrichmentConfig,
    pub clustering: ClusteringConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            reddit_client_id: String::new(),
            reddit_client_secret: String::new(),
            reddit_user_agent: "amon-hen/0.1".to_string(),
            bluesky_handle: String::new(),
            bluesky_app_password: String::new(),
            data_dir: PathBuf::from("data"),
            sources_yaml_path: PathBuf::from("sources.yaml"),
            sqlite_path: PathBuf::from("data/amon_hen.db"),
            vector_index_path: PathBuf::from("data/vectors.json"),
            vector_backend_mode: VectorBackendMode::default(),
            enrichment: EnrichmentConfig::default(),
            clustering: ClusteringConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, falling back to defaults for any
    /// field the document omits. A missing file yields plain defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AmError::new(AmErrorKind::Io)
                .with_op("settings_load")
                .with_message(e.to_string())
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            AmError::new(AmErrorKind::Serialization)
                .with_op("settings_load")
                .with_message(format!("invalid settings YAML at {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_baseline() {
        let settings = Settings::default();
        assert_eq!(settings.enrichment.daily_budget_usd, 2.00);
        assert_eq!(settings.clustering.min_cluster_size, 5);
        assert_eq!(settings.clustering.min_samples, 4);
        assert_eq!(settings.clustering.divergence_threshold, 0.3);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = Settings::load("/nonexistent/path/settings.yaml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_yaml_overrides_only_specified_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "enrichment:\n  daily_budget_usd: 10.0\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.enrichment.daily_budget_usd, 10.0);
        assert_eq!(settings.clustering.min_cluster_size, 5);
    }
}
