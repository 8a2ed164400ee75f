//! Automation configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;
use crate::job::{CommandSpec, JobSpec};

/// Automation controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Registered jobs. The key set is fixed for the process lifetime.
    #[serde(default = "default_jobs")]
    pub jobs: Vec<JobSpec>,

    /// Upper bound for one command invocation (in seconds).
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Upper bound for the status record-count query (in seconds).
    #[serde(default = "default_stats_timeout")]
    pub stats_timeout_secs: u64,

    /// Bounded wait for a stopping worker to exit (in seconds).
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,

    /// Whether to start all jobs when the process boots.
    #[serde(default)]
    pub autostart: bool,
}

fn default_jobs() -> Vec<JobSpec> {
    vec![
        JobSpec::new(
            "price_collection",
            "Price Collection",
            CommandSpec::new("python3", vec!["scripts/collect_prices.py".to_string()]),
            300, // 5 minutes
        ),
        JobSpec::new(
            "news_aggregation",
            "News Aggregation",
            CommandSpec::new("python3", vec!["scripts/fetch_news.py".to_string()]),
            1800, // 30 minutes
        ),
        JobSpec::new(
            "market_analysis",
            "Market Analysis",
            CommandSpec::new("python3", vec!["scripts/run_analysis.py".to_string()]),
            3600, // 1 hour
        ),
    ]
}

fn default_command_timeout() -> u64 {
    600 // 10 minutes
}

fn default_stats_timeout() -> u64 {
    10
}

fn default_stop_timeout() -> u64 {
    5
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            command_timeout_secs: default_command_timeout(),
            stats_timeout_secs: default_stats_timeout(),
            stop_timeout_secs: default_stop_timeout(),
            autostart: false,
        }
    }
}

impl AutomationConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AutomationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AutomationError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            AutomationError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the command timeout as a Duration.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Get the stats query timeout as a Duration.
    pub fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.stats_timeout_secs)
    }

    /// Get the worker stop wait as a Duration.
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), AutomationError> {
        if self.jobs.is_empty() {
            return Err(AutomationError::Config("no jobs registered".to_string()));
        }

        for job in &self.jobs {
            if job.id.is_empty() {
                return Err(AutomationError::Config("job id must not be empty".to_string()));
            }
            if job.interval_secs == 0 {
                return Err(AutomationError::Config(format!(
                    "job '{}': interval_secs must be > 0",
                    job.id
                )));
            }
            if job.command.program.is_empty() {
                return Err(AutomationError::Config(format!(
                    "job '{}': command program must not be empty",
                    job.id
                )));
            }
        }

        let mut ids: Vec<&str> = self.jobs.iter().map(|j| j.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != self.jobs.len() {
            return Err(AutomationError::Config("duplicate job ids".to_string()));
        }

        if self.command_timeout_secs == 0 {
            return Err(AutomationError::Config(
                "command_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.stats_timeout_secs == 0 {
            return Err(AutomationError::Config(
                "stats_timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutomationConfig::default();
        assert_eq!(config.jobs.len(), 3);
        assert_eq!(config.command_timeout_secs, 600);
        assert_eq!(config.stats_timeout_secs, 10);
        assert_eq!(config.stop_timeout_secs, 5);
        assert!(!config.autostart);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_registry_ids() {
        let config = AutomationConfig::default();
        let ids: Vec<&str> = config.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["price_collection", "news_aggregation", "market_analysis"]
        );
    }

    #[test]
    fn test_duration_getters() {
        let config = AutomationConfig::default();
        assert_eq!(config.command_timeout(), Duration::from_secs(600));
        assert_eq!(config.stats_timeout(), Duration::from_secs(10));
        assert_eq!(config.stop_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = AutomationConfig::default();
        config.jobs[0].interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let mut config = AutomationConfig::default();
        let dup = config.jobs[0].clone();
        config.jobs.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_jobs() {
        let config = AutomationConfig {
            jobs: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AutomationConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: AutomationConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.jobs.len(), config.jobs.len());
        assert_eq!(parsed.command_timeout_secs, config.command_timeout_secs);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AutomationConfig = toml::from_str("command_timeout_secs = 60").unwrap();
        assert_eq!(parsed.command_timeout_secs, 60);
        assert_eq!(parsed.jobs.len(), 3);
        assert_eq!(parsed.stats_timeout_secs, 10);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("automation.toml");
        std::fs::write(
            &path,
            r#"
command_timeout_secs = 120

[[jobs]]
id = "price_collection"
display_name = "Price Collection"
interval_secs = 60

[jobs.command]
program = "true"
"#,
        )
        .unwrap();

        let config = AutomationConfig::from_file(&path).unwrap();
        assert_eq!(config.command_timeout_secs, 120);
        assert_eq!(config.jobs.len(), 1);
        assert_eq!(config.jobs[0].interval_secs, 60);
    }

    #[test]
    fn test_from_file_missing() {
        let result = AutomationConfig::from_file("/nonexistent/automation.toml");
        assert!(matches!(result, Err(AutomationError::Config(_))));
    }
}
