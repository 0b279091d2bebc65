//! Configuration loading and typed config structures for SHDWNET.
//!
//! The configuration lives in `shdwnet-config.yaml`. Every section and
//! field has a default, so a missing file or a partial one still yields a
//! runnable pipeline. A handful of environment variables override the file
//! for deployment.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use shdwnet_feeds::{FeedsConfig, LexiconConfig};
use shdwnet_types::StrategyKind;

use crate::fusion::{BaselineRule, FusionError, FusionStrategy, FusionWeights};

/// Overrides `poll.interval_secs`.
pub const ENV_POLL_INTERVAL: &str = "SHDWNET_POLL_INTERVAL_SECS";
/// Overrides `observer.port`.
pub const ENV_OBSERVER_PORT: &str = "SHDWNET_OBSERVER_PORT";
/// Overrides `downstream.url`. An empty value disables the push.
pub const ENV_DOWNSTREAM_URL: &str = "SHDWNET_DOWNSTREAM_URL";
/// Overrides `fusion.noise_seed`.
pub const ENV_NOISE_SEED: &str = "SHDWNET_NOISE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path or variable name of the field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The fusion weight table is invalid.
    #[error("invalid fusion weights: {source}")]
    Fusion {
        /// The underlying fusion error.
        #[from]
        source: FusionError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration. Mirrors `shdwnet-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShdwnetConfig {
    /// Poll timing.
    #[serde(default)]
    pub poll: PollConfig,

    /// Feed adapters: enabled sources, endpoints, deadline.
    #[serde(default)]
    pub feeds: FeedsConfig,

    /// Fusion strategy and weights.
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Keyword tables for the social adapter.
    #[serde(default)]
    pub lexicon: LexiconConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Downstream signal push.
    #[serde(default)]
    pub downstream: DownstreamConfig,
}

impl ShdwnetConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, and
    /// [`ConfigError::Invalid`] or [`ConfigError::Fusion`] if validation
    /// fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    /// Environment overrides and validation apply either way.
    ///
    /// # Errors
    ///
    /// As [`ShdwnetConfig::from_file`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// As [`ShdwnetConfig::from_file`], minus I/O.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_raw(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML only, with no overrides and no validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_raw(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set to an
    /// unparseable value.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    ///
    /// # Errors
    ///
    /// As [`ShdwnetConfig::apply_env_overrides`].
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_POLL_INTERVAL) {
            self.poll.interval_secs = parse_var(ENV_POLL_INTERVAL, &val)?;
        }
        if let Some(val) = lookup(ENV_OBSERVER_PORT) {
            self.observer.port = parse_var(ENV_OBSERVER_PORT, &val)?;
        }
        if let Some(val) = lookup(ENV_DOWNSTREAM_URL) {
            let trimmed = val.trim();
            self.downstream.url = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        }
        if let Some(val) = lookup(ENV_NOISE_SEED) {
            self.fusion.noise_seed = Some(parse_var(ENV_NOISE_SEED, &val)?);
        }
        Ok(())
    }

    /// Check values that parse but cannot run.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a zero poll interval, a zero adapter
    /// deadline or an empty source list; [`ConfigError::Fusion`] for a bad
    /// weight table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_secs == 0 {
            return Err(invalid("poll.interval_secs", "must be greater than zero"));
        }
        if self.feeds.timeout_ms == 0 {
            return Err(invalid("feeds.timeout_ms", "must be greater than zero"));
        }
        if self.feeds.enabled.is_empty() {
            return Err(invalid("feeds.enabled", "at least one source is required"));
        }
        self.fusion.strategy()?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e: T::Err| invalid(key, &e.to_string()))
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollConfig {
    /// Delay before the first cycle, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Seconds between cycle starts.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Fusion strategy selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FusionConfig {
    /// `weighted` or `baseline`.
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,

    /// Weight per source name plus `noise`. Used by the weighted strategy.
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,

    /// Seed for the noise generator. Unset draws a seed from the OS.
    #[serde(default)]
    pub noise_seed: Option<u64>,
}

impl FusionConfig {
    /// Build the configured strategy.
    ///
    /// # Errors
    ///
    /// Any [`FusionError`] from validating the weight table. The table is
    /// validated even under the baseline strategy.
    pub fn strategy(&self) -> Result<FusionStrategy, FusionError> {
        let weights = FusionWeights::from_table(&self.weights)?;
        Ok(match self.strategy {
            StrategyKind::Weighted => FusionStrategy::Weighted(weights),
            StrategyKind::Baseline => FusionStrategy::Baseline(BaselineRule::default()),
        })
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            weights: default_weights(),
            noise_seed: None,
        }
    }
}

/// Observer HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,

    /// Journal events kept in memory.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
            log_capacity: default_log_capacity(),
        }
    }
}

/// Downstream signal push settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownstreamConfig {
    /// URL that receives `{"value": <signal>}` after each cycle. Unset
    /// disables the push.
    #[serde(default)]
    pub url: Option<String>,

    /// Deadline for one push, in milliseconds.
    #[serde(default = "default_downstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_downstream_timeout_ms(),
        }
    }
}

const fn default_initial_delay_ms() -> u64 {
    1_500
}

const fn default_interval_secs() -> u64 {
    300
}

const fn default_strategy() -> StrategyKind {
    StrategyKind::Weighted
}

fn default_weights() -> BTreeMap<String, f64> {
    FusionWeights::default().to_table()
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_log_capacity() -> usize {
    500
}

const fn default_downstream_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use shdwnet_types::SourceId;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = ShdwnetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll.initial_delay_ms, 1_500);
        assert_eq!(config.poll.interval_secs, 300);
        assert_eq!(config.observer.port, 8080);
        assert!(config.downstream.url.is_none());
        assert_eq!(
            config.fusion.strategy().unwrap(),
            FusionStrategy::Weighted(FusionWeights::default())
        );
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(ShdwnetConfig::parse_raw("").unwrap(), ShdwnetConfig::default());
    }

    #[test]
    fn parse_two_source_baseline() {
        let yaml = r"
poll:
  interval_secs: 60
feeds:
  timeout_ms: 2500
  enabled: [kindex, seismic]
  endpoints:
    seismic: http://localhost:9000/quakes.geojson
fusion:
  strategy: baseline
lexicon:
  crisis: [war, flood]
  matcher: whole_word
downstream:
  url: http://localhost:3333/signal
";
        let config = ShdwnetConfig::parse_raw(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll.interval_secs, 60);
        assert_eq!(config.poll.initial_delay_ms, 1_500);
        assert_eq!(config.feeds.enabled, vec![SourceId::KIndex, SourceId::Seismic]);
        assert_eq!(config.feeds.endpoints.seismic, "http://localhost:9000/quakes.geojson");
        assert_eq!(config.fusion.strategy, StrategyKind::Baseline);
        assert_eq!(config.lexicon.crisis, vec!["war", "flood"]);
        assert!(!config.lexicon.interest.is_empty());
        assert_eq!(config.downstream.url.as_deref(), Some("http://localhost:3333/signal"));
        assert!(matches!(
            config.fusion.strategy().unwrap(),
            FusionStrategy::Baseline(_)
        ));
    }

    #[test]
    fn zero_interval_rejected() {
        let config = ShdwnetConfig::parse_raw("poll:\n  interval_secs: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn bad_weights_rejected() {
        let yaml = "fusion:\n  weights:\n    kindex: 0.5\n    noise: 0.1\n";
        let config = ShdwnetConfig::parse_raw(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Fusion { .. })));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let result = ShdwnetConfig::parse_raw("poll: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_apply() {
        let mut config = ShdwnetConfig::default();
        config
            .apply_overrides(env(&[
                (ENV_POLL_INTERVAL, "30"),
                (ENV_OBSERVER_PORT, "9090"),
                (ENV_DOWNSTREAM_URL, "http://bot.local/signal"),
                (ENV_NOISE_SEED, "1234"),
            ]))
            .unwrap();
        assert_eq!(config.poll.interval_secs, 30);
        assert_eq!(config.observer.port, 9090);
        assert_eq!(config.downstream.url.as_deref(), Some("http://bot.local/signal"));
        assert_eq!(config.fusion.noise_seed, Some(1234));
    }

    #[test]
    fn empty_downstream_override_disables_push() {
        let mut config = ShdwnetConfig::default();
        config.downstream.url = Some("http://x".to_owned());
        config.apply_overrides(env(&[(ENV_DOWNSTREAM_URL, " ")])).unwrap();
        assert!(config.downstream.url.is_none());
    }

    #[test]
    fn garbage_override_rejected() {
        let mut config = ShdwnetConfig::default();
        let result = config.apply_overrides(env(&[(ENV_OBSERVER_PORT, "eighty")]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
