//! Agent configuration.
//!
//! Every setting the pipeline needs is carried in [`AgentConfig`] and passed
//! into the orchestrator explicitly. The library never reads environment
//! variables or process-wide globals, so tests can inject fake endpoints.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// A flat historical-score adjustment for a driver at a specific circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusEntry {
    pub driver_id: String,
    pub track_id: String,
    pub bonus: f64,
}

/// Circuit-specific score bonuses.
///
/// Kept as swappable data rather than hard-coded rules so the table can be
/// tuned per season without touching the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusTable {
    #[serde(default)]
    pub entries: Vec<BonusEntry>,
}

impl Default for BonusTable {
    fn default() -> Self {
        Self {
            entries: vec![
                BonusEntry {
                    driver_id: "leclerc".into(),
                    track_id: "monza".into(),
                    bonus: 1.0,
                },
                BonusEntry {
                    driver_id: "hamilton".into(),
                    track_id: "monza".into(),
                    bonus: 1.0,
                },
                BonusEntry {
                    driver_id: "verstappen".into(),
                    track_id: "zandvoort".into(),
                    bonus: 1.5,
                },
            ],
        }
    }
}

impl BonusTable {
    /// Historical-score bonus for a (driver, track) pair, 0.0 when unlisted.
    pub fn bonus_for(&self, driver_id: &str, track_id: &str) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.driver_id == driver_id && e.track_id == track_id)
            .map(|e| e.bonus)
            .sum()
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the session/telemetry API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the generative-text API.
    #[serde(default = "default_narrative_base_url")]
    pub narrative_base_url: String,

    /// Model used for narrative generation.
    #[serde(default = "default_narrative_model")]
    pub narrative_model: String,

    /// Credential for the generative-text API. Absence is a normal,
    /// handled condition: the narrative degrades, the numbers do not.
    #[serde(default)]
    pub api_credential: Option<String>,

    /// Surface live-data failure instead of falling back to simulation.
    #[serde(default)]
    pub strict_mode: bool,

    /// Timeout applied to every telemetry request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout applied to the narrative request.
    #[serde(default = "default_narrative_timeout")]
    pub narrative_timeout_secs: u64,

    /// Delay between scoring and summarizing, to make stage transitions
    /// observable by consumers. Zero disables it.
    #[serde(default = "default_pacing_delay")]
    pub pacing_delay_ms: u64,

    /// Circuit-specific score bonuses.
    #[serde(default)]
    pub bonuses: BonusTable,
}

fn default_api_base_url() -> String {
    "https://api.openf1.org/v1".to_string()
}

fn default_narrative_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_narrative_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_narrative_timeout() -> u64 {
    30
}

fn default_pacing_delay() -> u64 {
    200
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            narrative_base_url: default_narrative_base_url(),
            narrative_model: default_narrative_model(),
            api_credential: None,
            strict_mode: false,
            request_timeout_secs: default_request_timeout(),
            narrative_timeout_secs: default_narrative_timeout(),
            pacing_delay_ms: default_pacing_delay(),
            bonuses: BonusTable::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
