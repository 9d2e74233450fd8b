//! Agent orchestrator.
//!
//! Sequences resolver -> model -> summarizer as one state machine:
//!
//! ```text
//! Idle -> Fetching -> Scoring -> Summarizing -> Complete
//!            |
//!            +-> Error (strict policy only)
//! ```
//!
//! One logical run at a time; every run starts fresh from `Idle` and owns
//! its own stats and result values. States are broadcast over a watch
//! channel so consumers can render progress without polling.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::model::calculate_win_probability;
use crate::narrative::NarrativeClient;
use crate::openf1::TelemetryClient;
use crate::resolver::StatsResolver;
use crate::roster;
use crate::types::{AgentState, Driver, PredictionResult, Track};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The prediction pipeline orchestrator.
pub struct ApexAgent {
    config: AgentConfig,
    telemetry: TelemetryClient,
    resolver: StatsResolver,
    narrative: NarrativeClient,
    state_tx: watch::Sender<AgentState>,
}

impl ApexAgent {
    /// Build an agent from an explicit configuration. No hidden globals:
    /// everything the pipeline touches comes in through `config`.
    pub fn new(config: AgentConfig) -> Self {
        let telemetry = TelemetryClient::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        );
        let resolver = StatsResolver::new(&config);
        let narrative = NarrativeClient::new(&config);
        let (state_tx, _) = watch::channel(AgentState::Idle);

        Self {
            config,
            telemetry,
            resolver,
            narrative,
            state_tx,
        }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<AgentState> {
        self.state_tx.subscribe()
    }

    /// Current pipeline state.
    pub fn state(&self) -> AgentState {
        self.state_tx.borrow().clone()
    }

    /// True when the narrative stage has a credential to work with.
    pub fn has_narrative_credential(&self) -> bool {
        self.narrative.has_credential()
    }

    fn set_state(&self, state: AgentState) {
        self.state_tx.send_replace(state);
    }

    /// Load the driver grid and race calendar in parallel. Idempotent and
    /// safe to retry wholesale; either side degrades to the built-in data.
    pub async fn load_roster(&self) -> (Vec<Driver>, Vec<Track>) {
        tokio::join!(self.list_drivers(), self.list_tracks())
    }

    /// The driver grid, live from the latest race session when reachable.
    pub async fn list_drivers(&self) -> Vec<Driver> {
        match self.telemetry.live_roster().await {
            Ok(roster) => roster,
            Err(e) => {
                warn!("Live roster unavailable ({}), using built-in grid", e);
                roster::default_grid()
            }
        }
    }

    /// The race calendar. The session API has no calendar endpoint, so this
    /// is always the built-in season.
    pub async fn list_tracks(&self) -> Vec<Track> {
        roster::default_calendar()
    }

    /// Run one prediction without external cancellation.
    pub async fn run(
        &self,
        driver_id: &str,
        track_id: &str,
    ) -> Result<PredictionResult, AgentError> {
        self.run_with_cancel(driver_id, track_id, &CancellationToken::new())
            .await
    }

    /// Run one prediction, honoring `cancel` at every suspension point.
    ///
    /// Precondition: both ids must be non-empty. A missing selection is
    /// rejected before any state transition or network call. Cancellation
    /// discards the in-flight result and returns the machine to `Idle`.
    pub async fn run_with_cancel(
        &self,
        driver_id: &str,
        track_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PredictionResult, AgentError> {
        if driver_id.trim().is_empty() || track_id.trim().is_empty() {
            return Err(AgentError::InvalidSelection);
        }

        // Each invocation is a fresh run; no resume of a failed one.
        self.set_state(AgentState::Idle);
        info!("Prediction run starting: {} at {}", driver_id, track_id);

        self.set_state(AgentState::Fetching);
        let stats = match self.resolver.resolve(driver_id, track_id, cancel).await {
            Ok(stats) => stats,
            Err(AgentError::Cancelled) => {
                self.set_state(AgentState::Idle);
                return Err(AgentError::Cancelled);
            }
            Err(e) => {
                self.set_state(AgentState::Error(e.to_string()));
                return Err(e);
            }
        };

        self.set_state(AgentState::Scoring);
        let mut result = calculate_win_probability(&stats);

        // Pacing keeps the scoring stage observable; not a correctness
        // requirement, and zero disables it.
        if self.config.pacing_delay_ms > 0 {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.set_state(AgentState::Idle);
                    return Err(AgentError::Cancelled);
                }
                _ = tokio::time::sleep(Duration::from_millis(self.config.pacing_delay_ms)) => {}
            }
        }

        self.set_state(AgentState::Summarizing);
        let driver = self.display_driver(driver_id);
        let track = self.display_track(track_id);
        let narrative = tokio::select! {
            _ = cancel.cancelled() => {
                self.set_state(AgentState::Idle);
                return Err(AgentError::Cancelled);
            }
            text = self.narrative.summarize(&driver, &track, &result) => text,
        };
        result.narrative = Some(narrative);

        self.set_state(AgentState::Complete);
        info!(
            "Prediction complete: {} at {} -> {}%",
            driver_id, track_id, result.probability
        );
        Ok(result)
    }

    /// Display record for the prompt; unknown ids still get a usable label.
    fn display_driver(&self, driver_id: &str) -> Driver {
        roster::find_driver(driver_id).unwrap_or_else(|| Driver {
            id: driver_id.to_string(),
            name: driver_id.to_string(),
            team: "Unknown Team".to_string(),
        })
    }

    fn display_track(&self, track_id: &str) -> Track {
        roster::find_track(track_id).unwrap_or_else(|| Track {
            id: track_id.to_string(),
            name: track_id.to_string(),
            location: "Unknown".to_string(),
        })
    }
}
