use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use thiserror::Error;

use crate::sampler::SamplerConfig;
use crate::tracker::TrackerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub elements: ElementsConfig,
    pub sampler: SamplerConfig,
    pub propagator: PropagatorConfig,
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementsConfig {
    #[serde(default = "default_tle_folder")]
    pub tle_folder: PathBuf,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            tle_folder: default_tle_folder(),
        }
    }
}

fn default_tle_folder() -> PathBuf {
    PathBuf::from("tle")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropagatorConfig {
    #[serde(deserialize_with = "deserialize_time_delta")]
    pub validity_window: chrono::Duration,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            validity_window: chrono::Duration::days(30),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampler.step <= chrono::Duration::zero() {
            return Err(ConfigError::Invalid("sampler.step must be positive".into()));
        }
        if self.sampler.duration < chrono::Duration::zero() {
            return Err(ConfigError::Invalid(
                "sampler.duration must not be negative".into(),
            ));
        }
        if self.propagator.validity_window <= chrono::Duration::zero() {
            return Err(ConfigError::Invalid(
                "propagator.validity_window must be positive".into(),
            ));
        }
        self.tracker
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Parses a humantime duration such as `90m` or `1h 30m`.
pub fn parse_duration(s: &str) -> Result<chrono::Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| chrono::Duration::from_std(d).map_err(|e| e.to_string()))
}

pub(crate) fn deserialize_time_delta<'de, D>(deserializer: D) -> Result<chrono::Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_std_duration<'de, D>(
    deserializer: D,
) -> Result<std::time::Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

/// `null`, `off` or `never` disable the interval.
pub(crate) fn deserialize_optional_std_duration<'de, D>(
    deserializer: D,
) -> Result<Option<std::time::Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if matches!(s.trim(), "off" | "never") => Ok(None),
        Some(s) => humantime::parse_duration(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.elements.tle_folder, PathBuf::from("tle"));
        assert_eq!(config.sampler.step, chrono::Duration::seconds(60));
        assert_eq!(config.sampler.duration, chrono::Duration::hours(6));
        assert_eq!(config.sampler.ground_track_every, 10);
        assert_eq!(config.tracker.cadence, Duration::from_secs(5));
        assert_eq!(config.tracker.failure_threshold, 3);
    }

    #[test]
    fn durations_use_humantime_syntax() {
        let config = Config::from_yaml(
            "
web:
  bind: 127.0.0.1:9000
elements:
  tle_folder: /var/lib/tle
sampler:
  step: 30s
  duration: 90m
propagator:
  validity_window: 14days
tracker:
  cadence: 2s
  failure_threshold: 5
  refresh: off
",
        )
        .unwrap();

        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(config.sampler.step, chrono::Duration::seconds(30));
        assert_eq!(config.sampler.duration, chrono::Duration::minutes(90));
        assert_eq!(config.sampler.ground_track_every, 10);
        assert_eq!(config.propagator.validity_window, chrono::Duration::days(14));
        assert_eq!(config.tracker.cadence, Duration::from_secs(2));
        assert_eq!(config.tracker.failure_threshold, 5);
        assert_eq!(config.tracker.refresh, None);
    }

    #[test]
    fn rejects_zero_step_and_threshold() {
        assert!(matches!(
            Config::from_yaml("sampler:\n  step: 0s\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml("tracker:\n  failure_threshold: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml("tracker:\n  cadence: 0s\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn reports_unparseable_durations() {
        assert!(matches!(
            Config::from_yaml("sampler:\n  step: soon\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
