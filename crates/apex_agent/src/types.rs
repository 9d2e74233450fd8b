//! Core data types for the prediction pipeline.

use serde::{Deserialize, Serialize};

/// A driver on the current grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Lowercase surname, used as the lookup key everywhere.
    pub id: String,
    pub name: String,
    pub team: String,
}

/// A circuit on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub location: String,
}

/// Which resolver stage produced a stats record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsSource {
    /// Final position read from the latest race session.
    LiveSession,
    /// Deterministic tier baseline (registry reachable, driver absent).
    TierFallback,
    /// Synthetic scores, no network source reachable.
    Simulation,
}

/// Per-request scoring input for one (driver, track) pair.
///
/// Produced fresh by the resolver for every run, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStats {
    pub driver_id: String,
    pub track_id: String,
    /// Track-record proxy on a 0-10 scale.
    pub historical_score: f64,
    /// Recent-performance proxy on a 0-10 scale.
    pub recent_form_score: f64,
    pub total_races_at_track: u32,
    pub wins_at_track: u32,
    pub source: StatsSource,
}

/// Output of the probability model, optionally annotated with a narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Win probability in percent, one decimal.
    pub probability: f64,
    /// Historical share of the weighted score (0-60 sub-scale, informational).
    pub historical_contribution: f64,
    /// Form share of the weighted score (0-40 sub-scale, informational).
    pub form_contribution: f64,
    pub raw_stats: DriverStats,
    /// Appended after scoring; never affects the probability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Pipeline state, broadcast to consumers as a run progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    Fetching,
    Scoring,
    Summarizing,
    Complete,
    Error(String),
}

impl AgentState {
    /// True while a run is in flight (neither idle nor terminal).
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            AgentState::Fetching | AgentState::Scoring | AgentState::Summarizing
        )
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentState::Idle => write!(f, "idle"),
            AgentState::Fetching => write!(f, "fetching"),
            AgentState::Scoring => write!(f, "scoring"),
            AgentState::Summarizing => write!(f, "summarizing"),
            AgentState::Complete => write!(f, "complete"),
            AgentState::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}
