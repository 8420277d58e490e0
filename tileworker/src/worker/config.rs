//! Worker configuration.
//!
//! Defaults match the reference behaviour of a tile worker embedded in a
//! map viewer: newer draws supersede older ones and aborts are acknowledged.
//! Configuration can also be read from the `[worker]` section of an INI file:
//!
//! ```ini
//! [worker]
//! on_busy = supersede
//! acknowledge_abort = true
//! channel_capacity = 64
//! ```

use crate::error::ConfigError;
use ini::Ini;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default capacity of the inbound message channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// INI section holding worker settings.
pub const CONFIG_SECTION: &str = "worker";

/// What to do with a `draw` that arrives while another draw is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyPolicy {
    /// Refuse the new draw and report a warning. The running draw continues.
    Reject,
    /// Abort the running draw and start the new one.
    #[default]
    Supersede,
}

impl BusyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusyPolicy::Reject => "reject",
            BusyPolicy::Supersede => "supersede",
        }
    }
}

impl fmt::Display for BusyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(BusyPolicy::Reject),
            "supersede" => Ok(BusyPolicy::Supersede),
            _ => Err(ConfigError::InvalidValue {
                key: "on_busy".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for [`TileWorker`](crate::TileWorker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileWorkerConfig {
    /// Policy for a draw arriving while another is in flight.
    pub on_busy: BusyPolicy,

    /// Emit `draw:aborted` after handling `draw:abort`.
    pub acknowledge_abort: bool,

    /// Inbound channel capacity used by [`worker_channel`](crate::worker_channel) callers.
    pub channel_capacity: usize,
}

impl Default for TileWorkerConfig {
    fn default() -> Self {
        Self {
            on_busy: BusyPolicy::default(),
            acknowledge_abort: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl TileWorkerConfig {
    /// Set the busy policy.
    pub fn with_on_busy(mut self, on_busy: BusyPolicy) -> Self {
        self.on_busy = on_busy;
        self
    }

    /// Enable or disable the `draw:aborted` acknowledgement.
    pub fn with_acknowledge_abort(mut self, acknowledge: bool) -> Self {
        self.acknowledge_abort = acknowledge;
        self
    }

    /// Set the inbound channel capacity. Zero is raised to one.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Parse configuration from INI text.
    ///
    /// Missing keys keep their defaults; keys outside `[worker]` and unknown
    /// keys are ignored.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        let mut config = Self::default();

        let Some(section) = ini.section(Some(CONFIG_SECTION)) else {
            return Ok(config);
        };

        if let Some(value) = section.get("on_busy") {
            config.on_busy = value.parse()?;
        }
        if let Some(value) = section.get("acknowledge_abort") {
            config.acknowledge_abort = parse_bool("acknowledge_abort", value)?;
        }
        if let Some(value) = section.get("channel_capacity") {
            config.channel_capacity = parse_capacity(value)?;
        }

        Ok(config)
    }

    /// Load configuration from an INI file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ini_str(&text)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_capacity(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        // tokio channels panic on zero capacity
        Ok(capacity) if capacity > 0 => Ok(capacity),
        _ => Err(ConfigError::InvalidValue {
            key: "channel_capacity".to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TileWorkerConfig::default();
        assert_eq!(config.on_busy, BusyPolicy::Supersede);
        assert!(config.acknowledge_abort);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_builders() {
        let config = TileWorkerConfig::default()
            .with_on_busy(BusyPolicy::Reject)
            .with_acknowledge_abort(false)
            .with_channel_capacity(8);
        assert_eq!(config.on_busy, BusyPolicy::Reject);
        assert!(!config.acknowledge_abort);
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn test_zero_channel_capacity_is_raised_to_one() {
        let config = TileWorkerConfig::default().with_channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);

        // The resulting capacity must be accepted by the channel constructor.
        let _ = crate::protocol::worker_channel(config.channel_capacity);
    }

    #[test]
    fn test_busy_policy_from_str() {
        assert_eq!("reject".parse::<BusyPolicy>().unwrap(), BusyPolicy::Reject);
        assert_eq!(" Supersede ".parse::<BusyPolicy>().unwrap(), BusyPolicy::Supersede);
        assert!("queue".parse::<BusyPolicy>().is_err());
        assert_eq!(BusyPolicy::Reject.to_string(), "reject");
    }

    #[test]
    fn test_from_ini_str() {
        let config = TileWorkerConfig::from_ini_str(
            "[worker]\non_busy = reject\nacknowledge_abort = no\nchannel_capacity = 16\n",
        )
        .unwrap();
        assert_eq!(config.on_busy, BusyPolicy::Reject);
        assert!(!config.acknowledge_abort);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_from_ini_str_without_section_uses_defaults() {
        let config = TileWorkerConfig::from_ini_str("[other]\non_busy = reject\n").unwrap();
        assert_eq!(config, TileWorkerConfig::default());
    }

    #[test]
    fn test_from_ini_str_ignores_unknown_keys() {
        let config = TileWorkerConfig::from_ini_str("[worker]\ncolour = blue\n").unwrap();
        assert_eq!(config, TileWorkerConfig::default());
    }

    #[test]
    fn test_from_ini_str_invalid_values() {
        let err = TileWorkerConfig::from_ini_str("[worker]\non_busy = queue\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "on_busy"));

        let err =
            TileWorkerConfig::from_ini_str("[worker]\nacknowledge_abort = maybe\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "acknowledge_abort"));

        let err = TileWorkerConfig::from_ini_str("[worker]\nchannel_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "channel_capacity"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[worker]").unwrap();
        writeln!(file, "on_busy = reject").unwrap();

        let config = TileWorkerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.on_busy, BusyPolicy::Reject);
    }

    #[test]
    fn test_from_missing_file() {
        let err = TileWorkerConfig::from_file("/nonexistent/tileworker.ini").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
