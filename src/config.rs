//! Process configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

use crate::board::{MapError, MapGraph};
use crate::server::RegistrySettings;

/// Default bound of each game's request channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {source_name}: {reason}")]
    InvalidValue {
        source_name: String,
        value: String,
        reason: String,
    },

    #[error("flag {0} expects a value")]
    MissingValue(String),

    #[error(transparent)]
    Map(#[from] MapError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON map file. `None` uses the built-in 6x6 map.
    pub map_path: Option<PathBuf>,
    /// Base seed for starting-position deals. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Bound of each game's request channel.
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: None,
            seed: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from the process environment and arguments.
    ///
    /// Environment variables:
    /// - `SUPPLYLINE_MAP` - path to a JSON map file
    /// - `SUPPLYLINE_SEED` - base seed for deals
    /// - `SUPPLYLINE_CHANNEL_CAPACITY` - per-game request queue bound
    ///
    /// CLI flags `--map`, `--seed` and `--channel-capacity` take precedence.
    /// Log filtering is read separately from `RUST_LOG`.
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Builds a config from explicit arguments and an environment lookup.
    pub fn from_sources(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |flag: &str, var: &str| -> Result<Option<(String, String)>, ConfigError> {
            if let Some(value) = cli_value(args, flag)? {
                return Ok(Some((flag.to_string(), value)));
            }
            Ok(env(var).map(|v| (var.to_string(), v)))
        };

        let mut config = Config::default();

        if let Some((_, path)) = pick("--map", "SUPPLYLINE_MAP")? {
            config.map_path = Some(PathBuf::from(path));
        }
        if let Some((name, value)) = pick("--seed", "SUPPLYLINE_SEED")? {
            config.seed = Some(parse(&name, &value)?);
        }
        if let Some((name, value)) = pick("--channel-capacity", "SUPPLYLINE_CHANNEL_CAPACITY")? {
            let capacity: usize = parse(&name, &value)?;
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    source_name: name,
                    value,
                    reason: "must be at least 1".into(),
                });
            }
            config.channel_capacity = capacity;
        }

        Ok(config)
    }

    /// Loads the configured map, or the built-in one.
    pub fn map(&self) -> Result<MapGraph, ConfigError> {
        match &self.map_path {
            Some(path) => Ok(MapGraph::load(path)?),
            None => Ok(MapGraph::standard()),
        }
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            seed: self.seed,
            channel_capacity: self.channel_capacity,
        }
    }
}

/// Parse a CLI flag value like `--seed 7`.
fn cli_value(args: &[String], flag: &str) -> Result<Option<String>, ConfigError> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .cloned()
            .map(Some)
            .ok_or_else(|| ConfigError::MissingValue(flag.to_string())),
        None => Ok(None),
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        source_name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_sources(&[], env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.map().unwrap().len(), 36);
    }

    #[test]
    fn env_values() {
        let config = Config::from_sources(
            &[],
            env(&[
                ("SUPPLYLINE_SEED", "42"),
                ("SUPPLYLINE_CHANNEL_CAPACITY", "8"),
                ("SUPPLYLINE_MAP", "maps/x.json"),
            ]),
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.map_path, Some(PathBuf::from("maps/x.json")));
    }

    #[test]
    fn cli_overrides_env() {
        let config = Config::from_sources(
            &args(&["--seed", "7", "--channel-capacity", "2"]),
            env(&[("SUPPLYLINE_SEED", "42")]),
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.registry_settings().channel_capacity, 2);
    }

    #[test]
    fn bad_values_are_errors() {
        let err = Config::from_sources(&args(&["--seed", "abc"]), env(&[])).unwrap_err();
        assert!(err.to_string().contains("--seed"));

        let err = Config::from_sources(&[], env(&[("SUPPLYLINE_CHANNEL_CAPACITY", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = Config::from_sources(&args(&["--map"]), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue(_)));
    }

    #[test]
    fn missing_map_file_is_an_error() {
        let config = Config {
            map_path: Some(PathBuf::from("/nonexistent/supplyline-map.json")),
            ..Config::default()
        };
        assert!(matches!(config.map(), Err(ConfigError::Map(_))));
    }
}
