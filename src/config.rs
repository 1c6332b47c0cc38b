//! Runtime configuration read from the environment.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{TaskError, TaskResult};
use crate::store::DEFAULT_DATA_FILE;
use crate::summary::DashboardLimits;

pub const ENV_DATA_FILE: &str = "TASKERS_DATA_FILE";
pub const ENV_RECENT_LIMIT: &str = "TASKERS_RECENT_LIMIT";
pub const ENV_OVERDUE_LIMIT: &str = "TASKERS_OVERDUE_LIMIT";
pub const ENV_LOG: &str = "TASKERS_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file holding the tasks.
    pub data_file: PathBuf,
    pub limits: DashboardLimits,
    /// `tracing_subscriber::EnvFilter` directive, if set.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            limits: DashboardLimits::default(),
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_env() -> TaskResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TaskResult<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            data_file: get(ENV_DATA_FILE).map_or(defaults.data_file, PathBuf::from),
            limits: DashboardLimits {
                recent: parse_limit(ENV_RECENT_LIMIT, get(ENV_RECENT_LIMIT))?
                    .unwrap_or(defaults.limits.recent),
                overdue: parse_limit(ENV_OVERDUE_LIMIT, get(ENV_OVERDUE_LIMIT))?
                    .unwrap_or(defaults.limits.overdue),
            },
            log_filter: get(ENV_LOG),
        };
        debug!(?config, "loaded configuration");
        Ok(config)
    }
}

fn parse_limit(key: &str, raw: Option<String>) -> TaskResult<Option<usize>> {
    raw.map(|value| {
        value.trim().parse::<usize>().map_err(|err| TaskError::Config {
            reason: format!("{key}={value}: {err}"),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_file, PathBuf::from("taskers.json"));
        assert_eq!(config.limits.recent, 5);
        assert_eq!(config.limits.overdue, 3);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_DATA_FILE, "/tmp/tasks.json"),
            (ENV_RECENT_LIMIT, "10"),
            (ENV_LOG, "taskers=trace"),
        ]))
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/tasks.json"));
        assert_eq!(config.limits.recent, 10);
        assert_eq!(config.limits.overdue, 3);
        assert_eq!(config.log_filter.as_deref(), Some("taskers=trace"));
    }

    #[test]
    fn bad_limit_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[(ENV_OVERDUE_LIMIT, "three")])).unwrap_err();
        assert!(matches!(err, TaskError::Config { .. }));
    }
}
