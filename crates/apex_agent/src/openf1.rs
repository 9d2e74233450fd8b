//! Session telemetry client.
//!
//! Thin read-only client for the upstream session API. The resolver needs
//! three lookups: the latest race session, a driver's car number within it,
//! and that car's last recorded position.

use crate::error::AgentError;
use crate::types::Driver;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A race session as reported by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub session_key: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// A driver entry within a session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDriver {
    #[serde(default)]
    pub driver_number: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// One position update for a car within a session.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionUpdate {
    pub position: u32,
}

/// Read-only client for the session registry.
pub struct TelemetryClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelemetryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a JSON list, mapping non-2xx statuses to telemetry errors.
    async fn get_list<T: for<'de> Deserialize<'de>>(
        &self,
        path_and_query: &str,
    ) -> Result<Vec<T>, AgentError> {
        let url = format!("{}/{}", self.base_url, path_and_query);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Telemetry(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// The most recent race session: maximum session key, first entry after
    /// a descending sort when keys collide.
    pub async fn latest_race_session(&self) -> Result<Session, AgentError> {
        let mut sessions: Vec<Session> = self.get_list("sessions?session_type=Race").await?;
        if sessions.is_empty() {
            return Err(AgentError::Telemetry(
                "no race sessions found in registry".into(),
            ));
        }

        sessions.sort_by(|a, b| b.session_key.cmp(&a.session_key));
        let latest = sessions.remove(0);
        info!(
            "Latest session identified: {} - {} ({})",
            latest.session_key,
            latest.location.as_deref().unwrap_or("unknown"),
            latest.year.map_or_else(|| "?".into(), |y| y.to_string()),
        );
        Ok(latest)
    }

    /// Look up a driver by surname within a session. `Ok(None)` means the
    /// registry answered but the driver did not take part.
    pub async fn find_driver(
        &self,
        session_key: i64,
        driver_id: &str,
    ) -> Result<Option<SessionDriver>, AgentError> {
        // The registry stores surnames capitalized ('verstappen' -> 'Verstappen').
        let surname = capitalize(driver_id);
        let drivers: Vec<SessionDriver> = self
            .get_list(&format!(
                "drivers?session_key={}&last_name={}",
                session_key, surname
            ))
            .await?;
        Ok(drivers.into_iter().next())
    }

    /// The car's final recorded position, `Ok(None)` when the position
    /// stream is empty for this driver.
    pub async fn final_position(
        &self,
        session_key: i64,
        driver_number: i64,
    ) -> Result<Option<u32>, AgentError> {
        let positions: Vec<PositionUpdate> = self
            .get_list(&format!(
                "position?session_key={}&driver_number={}",
                session_key, driver_number
            ))
            .await?;
        Ok(positions.last().map(|p| p.position))
    }

    /// The full driver roster of the latest race session, deduplicated by
    /// surname and sorted by team.
    pub async fn live_roster(&self) -> Result<Vec<Driver>, AgentError> {
        let session = self.latest_race_session().await?;
        let entries: Vec<SessionDriver> = self
            .get_list(&format!("drivers?session_key={}", session.session_key))
            .await?;

        // Drivers can appear multiple times in the stream
        let mut unique: HashMap<String, Driver> = HashMap::new();
        for entry in entries {
            let (Some(last_name), Some(_number)) = (&entry.last_name, entry.driver_number) else {
                continue;
            };
            let id = last_name.to_lowercase();
            if unique.contains_key(&id) {
                continue;
            }
            let name = entry.full_name.clone().unwrap_or_else(|| {
                format!(
                    "{} {}",
                    entry.first_name.as_deref().unwrap_or(""),
                    last_name
                )
                .trim()
                .to_string()
            });
            unique.insert(
                id.clone(),
                Driver {
                    id,
                    name,
                    team: entry
                        .team_name
                        .clone()
                        .unwrap_or_else(|| "Unknown Team".to_string()),
                },
            );
        }

        if unique.is_empty() {
            warn!("Session {} listed no usable drivers", session.session_key);
            return Err(AgentError::Telemetry(format!(
                "session {} has an empty roster",
                session.session_key
            )));
        }

        let mut roster: Vec<Driver> = unique.into_values().collect();
        roster.sort_by(|a, b| a.team.cmp(&b.team).then_with(|| a.name.cmp(&b.name)));
        info!("Grid loaded: {} drivers in session {}", roster.len(), session.session_key);
        Ok(roster)
    }
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("verstappen"), "Verstappen");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_session_parsing_tolerates_missing_fields() {
        let json = r#"[{"session_key": 9999}, {"session_key": 9998, "location": "Monza", "year": 2025}]"#;
        let sessions: Vec<Session> = serde_json::from_str(json).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].location.is_none());
        assert_eq!(sessions[1].location.as_deref(), Some("Monza"));
    }

    #[test]
    fn test_position_parsing() {
        let json = r#"[{"position": 3, "date": "2025-05-04T14:00:00"}, {"position": 1}]"#;
        let positions: Vec<PositionUpdate> = serde_json::from_str(json).unwrap();
        assert_eq!(positions.last().unwrap().position, 1);
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_a_telemetry_error() {
        // Nothing listens on port 9; the connection is refused immediately.
        let client = TelemetryClient::new("http://127.0.0.1:9/v1", Duration::from_secs(1));
        let err = client.latest_race_session().await.unwrap_err();
        assert!(matches!(err, AgentError::Http(_)));
    }
}
