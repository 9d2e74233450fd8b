//! Narrative summarizer.
//!
//! Turns a finished prediction into a short tactical analysis via an
//! external generative-text service. Strictly an enhancement: missing
//! credentials, transport failures, and malformed responses all degrade to
//! a labeled placeholder so the numeric result is never invalidated.

use crate::config::AgentConfig;
use crate::types::{Driver, PredictionResult, Track};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const DEGRADED_PREFIX: &str = "Agent insight unavailable";

/// Client for the generative-text API.
pub struct NarrativeClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    credential: Option<String>,
}

impl NarrativeClient {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.narrative_timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config.narrative_base_url.trim_end_matches('/').to_string(),
            model: config.narrative_model.clone(),
            // Stray whitespace from copy-pasted keys breaks authentication
            credential: config
                .api_credential
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Generate a two-sentence analysis of the prediction. Total: every
    /// failure path returns a placeholder string instead of an error.
    pub async fn summarize(
        &self,
        driver: &Driver,
        track: &Track,
        result: &PredictionResult,
    ) -> String {
        let Some(credential) = &self.credential else {
            return format!(
                "{}: no credential configured. The statistical prediction stands on its own.",
                DEGRADED_PREFIX
            );
        };

        let prompt = build_prompt(driver, track, result);
        match self.generate(credential, &prompt).await {
            Ok(text) => text,
            Err(message) => {
                warn!("Narrative generation failed: {}", message);
                format!(
                    "{}: analysis service offline ({}). The statistical prediction stands on its own.",
                    DEGRADED_PREFIX, message
                )
            }
        }
    }

    /// Single generate-text call. Errors are returned as display strings
    /// since the caller only ever folds them into the placeholder.
    async fn generate(&self, credential: &str, prompt: &str) -> Result<String, String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, credential
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!("Requesting narrative from model {}", self.model);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(extract_error_message(&error_body)
                .unwrap_or_else(|| format!("service returned {}", status)));
        }

        let payload: Value = response.json().await.map_err(|e| e.to_string())?;
        extract_candidate_text(&payload).ok_or_else(|| "empty response".to_string())
    }
}

/// Fixed prompt template embedding the prediction breakdown.
fn build_prompt(driver: &Driver, track: &Track, result: &PredictionResult) -> String {
    format!(
        "You are a Formula 1 strategy analyst.\n\
         Analyze the following prediction data:\n\n\
         Driver: {} ({})\n\
         Track: {}, {}\n\
         Predicted Win Probability: {}%\n\n\
         Key Metrics:\n\
         - Historical Track Performance Rating: {}/10\n\
         - Recent Form Rating: {}/10\n\n\
         Task: Write a concise, professional 2-sentence tactical analysis \
         explaining this probability. Focus on the balance between their \
         history at this track and their current season form. Use technical \
         F1 terminology (e.g., downforce, tire degradation, sector times, \
         chassis balance).",
        driver.name,
        driver.team,
        track.name,
        track.location,
        result.probability,
        result.raw_stats.historical_score,
        result.raw_stats.recent_form_score,
    )
}

/// First candidate text from a generate-content response.
fn extract_candidate_text(payload: &Value) -> Option<String> {
    let text = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Pull the human-readable message out of a JSON error body, if there is one.
fn extract_error_message(body: &str) -> Option<String> {
    let start = body.find('{')?;
    let value: Value = serde_json::from_str(&body[start..]).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DriverStats, StatsSource};

    fn fixtures() -> (Driver, Track, PredictionResult) {
        let driver = Driver {
            id: "leclerc".into(),
            name: "Charles Leclerc".into(),
            team: "Ferrari".into(),
        };
        let track = Track {
            id: "monza".into(),
            name: "Monza".into(),
            location: "Italy".into(),
        };
        let stats = DriverStats {
            driver_id: "leclerc".into(),
            track_id: "monza".into(),
            historical_score: 9.5,
            recent_form_score: 8.2,
            total_races_at_track: 0,
            wins_at_track: 0,
            source: StatsSource::TierFallback,
        };
        let result = PredictionResult {
            probability: 80.1,
            historical_contribution: 57.0,
            form_contribution: 32.8,
            raw_stats: stats,
            narrative: None,
        };
        (driver, track, result)
    }

    fn client(credential: Option<&str>) -> NarrativeClient {
        let config = AgentConfig {
            narrative_base_url: "http://127.0.0.1:9".into(),
            api_credential: credential.map(String::from),
            narrative_timeout_secs: 1,
            ..AgentConfig::default()
        };
        NarrativeClient::new(&config)
    }

    #[test]
    fn test_prompt_embeds_prediction() {
        let (driver, track, result) = fixtures();
        let prompt = build_prompt(&driver, &track, &result);
        assert!(prompt.contains("Charles Leclerc (Ferrari)"));
        assert!(prompt.contains("Monza, Italy"));
        assert!(prompt.contains("80.1%"));
        assert!(prompt.contains("9.5/10"));
        assert!(prompt.contains("8.2/10"));
    }

    #[test]
    fn test_extract_candidate_text() {
        let payload: Value = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  Strong run expected.  "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_candidate_text(&payload).as_deref(),
            Some("Strong run expected.")
        );
    }

    #[test]
    fn test_extract_candidate_text_rejects_empty() {
        let payload: Value =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#)
                .unwrap();
        assert!(extract_candidate_text(&payload).is_none());
        assert!(extract_candidate_text(&Value::Null).is_none());
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"400 Bad Request {"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("API key not valid")
        );
        assert!(extract_error_message("plain text failure").is_none());
    }

    #[test]
    fn test_blank_credential_is_treated_as_missing() {
        assert!(!client(Some("   ")).has_credential());
        assert!(client(Some(" key ")).has_credential());
        assert!(!client(None).has_credential());
    }

    #[tokio::test]
    async fn test_missing_credential_degrades() {
        let (driver, track, result) = fixtures();
        let text = client(None).summarize(&driver, &track, &result).await;
        assert!(text.starts_with(DEGRADED_PREFIX));
        assert!(text.contains("no credential"));
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades() {
        let (driver, track, result) = fixtures();
        let text = client(Some("k")).summarize(&driver, &track, &result).await;
        assert!(text.starts_with(DEGRADED_PREFIX));
        assert!(text.contains("offline"));
    }
}
