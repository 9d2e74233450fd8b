//! Race-win prediction pipeline.
//!
//! Combines live session telemetry, a tiered fallback model, and an
//! optional generative-text summarizer behind a single agent state machine.
//! The presentation layer (CLI, UI, whatever) is a consumer of this crate
//! and holds no prediction logic of its own.

pub mod agent;
pub mod config;
pub mod error;
pub mod model;
pub mod narrative;
pub mod openf1;
pub mod resolver;
pub mod roster;
pub mod tiers;
pub mod types;

pub use agent::ApexAgent;
pub use config::{AgentConfig, BonusEntry, BonusTable};
pub use error::AgentError;
pub use model::calculate_win_probability;
pub use resolver::{ResolvePolicy, StatsResolver};
pub use types::{AgentState, Driver, DriverStats, PredictionResult, StatsSource, Track};
