//! Command implementations for apexctl.

use anyhow::Result;
use apex_agent::{AgentConfig, AgentState, ApexAgent, StatsSource};
use owo_colors::OwoColorize;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Environment variable consulted for the narrative credential when no
/// --credential flag is given. Resolved here at the binary boundary; the
/// library itself never reads the environment.
const CREDENTIAL_ENV: &str = "APEX_API_CREDENTIAL";

/// Load the config file if given, otherwise defaults.
pub fn resolve_config(path: Option<&Path>) -> AgentConfig {
    match path {
        Some(path) => AgentConfig::load_or_default(path),
        None => AgentConfig::default(),
    }
}

/// List the driver grid, grouped by team.
pub async fn drivers(config: AgentConfig) -> Result<()> {
    let agent = ApexAgent::new(config);
    let drivers = agent.list_drivers().await;

    let mut current_team = String::new();
    for driver in &drivers {
        if driver.team != current_team {
            println!("\n{}", driver.team.bold());
            current_team = driver.team.clone();
        }
        println!("  {:<12} {}", driver.id, driver.name);
    }
    println!("\n{} drivers", drivers.len());
    Ok(())
}

/// List the race calendar in season order.
pub async fn tracks(config: AgentConfig) -> Result<()> {
    let agent = ApexAgent::new(config);
    let tracks = agent.list_tracks().await;

    for (round, track) in tracks.iter().enumerate() {
        println!("  R{:02}  {:<12} {} ({})", round + 1, track.id, track.name, track.location);
    }
    Ok(())
}

/// Run one prediction, rendering stage transitions as they happen.
pub async fn predict(
    mut config: AgentConfig,
    driver: &str,
    track: &str,
    strict: bool,
    credential: Option<String>,
) -> Result<()> {
    if strict {
        config.strict_mode = true;
    }
    if let Some(credential) = credential.or_else(|| std::env::var(CREDENTIAL_ENV).ok()) {
        config.api_credential = Some(credential);
    }

    let agent = ApexAgent::new(config);
    let mut rx = agent.subscribe();

    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            match &*rx.borrow_and_update() {
                AgentState::Fetching => println!("{} fetching telemetry...", "[apex]".dimmed()),
                AgentState::Scoring => println!("{} scoring...", "[apex]".dimmed()),
                AgentState::Summarizing => println!("{} summarizing...", "[apex]".dimmed()),
                _ => {}
            }
        }
    });

    // Ctrl-C cancels the in-flight run at its next suspension point.
    let cancel = CancellationToken::new();
    let outcome = {
        let run = agent.run_with_cancel(driver, track, &cancel);
        tokio::pin!(run);
        tokio::select! {
            outcome = &mut run => outcome,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                run.await
            }
        }
    };

    // Dropping the agent closes the watch channel and ends the watcher.
    drop(agent);
    let _ = watcher.await;

    match outcome {
        Ok(result) => {
            let source = match result.raw_stats.source {
                StatsSource::LiveSession => "LIVE DATA".green().to_string(),
                StatsSource::TierFallback => "TIER BASELINE".yellow().to_string(),
                StatsSource::Simulation => "SIMULATION".yellow().to_string(),
            };

            println!();
            println!(
                "{} {} at {}  [{}]",
                "Win probability:".bold(),
                format!("{:.1}%", result.probability).bold().green(),
                track,
                source
            );
            println!(
                "  historical {:.1}/10 (contribution {:.0})",
                result.raw_stats.historical_score, result.historical_contribution
            );
            println!(
                "  form       {:.1}/10 (contribution {:.0})",
                result.raw_stats.recent_form_score, result.form_contribution
            );
            if let Some(narrative) = &result.narrative {
                println!("\n{}", narrative.italic());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Connectivity check for both upstream services.
pub async fn doctor(config: AgentConfig) -> Result<()> {
    let timeout = std::time::Duration::from_secs(config.request_timeout_secs);
    let telemetry = apex_agent::openf1::TelemetryClient::new(&config.api_base_url, timeout);

    match telemetry.latest_race_session().await {
        Ok(session) => println!(
            "telemetry registry ... {} (latest session {})",
            "ok".green(),
            session.session_key
        ),
        Err(e) => println!("telemetry registry ... {} ({})", "unreachable".red(), e),
    }

    let agent = ApexAgent::new(config);
    if agent.has_narrative_credential() {
        println!("narrative credential ... {}", "present".green());
    } else {
        println!(
            "narrative credential ... {} (predictions still work, narrative degrades)",
            "missing".yellow()
        );
    }

    Ok(())
}
