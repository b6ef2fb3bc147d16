//! Application-level configuration loading, including seed tournaments.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dto::tournament::{RaceInput, RingConfigurationInput};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "FLYBALL_RINGS_CONFIG_PATH";
const DEFAULT_SSE_CAPACITY: usize = 16;
const DEFAULT_LATENCY_ALERT_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    sse_capacity: usize,
    notification_latency_alert: Duration,
    tournaments: Vec<SeedTournament>,
}

/// Tournament loaded into the catalog at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedTournament {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub races: Vec<RaceInput>,
    #[serde(default)]
    pub rings: Option<Vec<RingConfigurationInput>>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        tournaments = app_config.tournaments.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse configuration from a JSON document; absent keys take their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Buffered events per tournament before slow SSE subscribers start lagging.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }

    /// Delivery latency above which a notification is reported.
    pub fn notification_latency_alert(&self) -> Duration {
        self.notification_latency_alert
    }

    pub fn tournaments(&self) -> &[SeedTournament] {
        &self.tournaments
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sse_capacity: DEFAULT_SSE_CAPACITY,
            notification_latency_alert: Duration::from_millis(DEFAULT_LATENCY_ALERT_MS),
            tournaments: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default = "default_sse_capacity")]
    sse_capacity: usize,
    #[serde(default = "default_latency_alert_ms")]
    notification_latency_alert_ms: u64,
    #[serde(default)]
    tournaments: Vec<SeedTournament>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            // broadcast::channel panics on zero capacity
            sse_capacity: value.sse_capacity.max(1),
            notification_latency_alert: Duration::from_millis(value.notification_latency_alert_ms),
            tournaments: value.tournaments,
        }
    }
}

fn default_sse_capacity() -> usize {
    DEFAULT_SSE_CAPACITY
}

fn default_latency_alert_ms() -> u64 {
    DEFAULT_LATENCY_ALERT_MS
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn parses_seed_tournaments() {
        let config = AppConfig::from_json(
            r#"{
                "sse_capacity": 32,
                "notification_latency_alert_ms": 500,
                "tournaments": [{
                    "id": "spring-cup",
                    "name": "Spring Cup",
                    "races": [{ "race_number": 1, "left_team": "Zoomies", "right_team": "Fetch" }],
                    "rings": [{ "ring_number": 1, "color": "Red" }]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.sse_capacity(), 32);
        assert_eq!(config.notification_latency_alert(), Duration::from_millis(500));
        let seed = &config.tournaments()[0];
        assert_eq!(seed.id, "spring-cup");
        assert_eq!(seed.races[0].division, "");
        assert_eq!(seed.rings.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let config = AppConfig::from_json(r#"{ "sse_capacity": 0 }"#).unwrap();
        assert_eq!(config.sse_capacity(), 1);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
