//! Configuration loading from celerity.toml
//!
//! Celerity configuration can be specified in a `celerity.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags override anything set here.

use anyhow::Context;
use celerity_core::{AdaptiveSampling, FailurePolicy, RunnerConfig};
use celerity_stats::{DEFAULT_MAX_SAMPLES, DEFAULT_MIN_SAMPLES, DEFAULT_TARGET_RSE, StoppingRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`CelerityConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "celerity.toml";

/// Celerity configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CelerityConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

/// `[runner]` table
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerSection {
    /// "abort-descriptor" or "skip-sample"
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Extra attempts for a failed benchmark
    #[serde(default)]
    pub retries: u32,
    /// Pin the measuring thread to this CPU
    #[serde(default)]
    pub pin_cpu: Option<usize>,
    /// Adaptive sampling for benchmarks registered with `samples = 0`
    #[serde(default)]
    pub auto: AutoSection,
}

/// `[runner.auto]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSection {
    /// Samples collected before convergence is checked
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Hard cap on samples
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Time budget per benchmark (e.g., "5s")
    #[serde(default = "default_max_time")]
    pub max_time: String,
    /// Target relative standard error of the mean (0.01 = 1%)
    #[serde(default = "default_target_rse")]
    pub target_rse: f64,
}

impl Default for AutoSection {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            max_samples: default_max_samples(),
            max_time: default_max_time(),
            target_rse: default_target_rse(),
        }
    }
}

fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}
fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}
fn default_max_time() -> String {
    "5s".to_string()
}
fn default_target_rse() -> f64 {
    DEFAULT_TARGET_RSE
}

/// `[output]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Write the report here instead of stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: default_format(),
            file: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl CelerityConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Find `celerity.toml` by walking up from the current directory
    pub fn find() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Discover and load configuration; defaults when no file exists.
    ///
    /// A file that exists but does not parse is an error.
    pub fn discover() -> anyhow::Result<Self> {
        match Self::find() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Runner settings described by this file
    pub fn runner_config(&self) -> anyhow::Result<RunnerConfig> {
        let auto = &self.runner.auto;
        let max_time_ns = Self::parse_duration(&auto.max_time)
            .context("invalid [runner.auto] max_time")?;
        let rule = StoppingRule::new(auto.min_samples, auto.max_samples, auto.target_rse)
            .context("invalid [runner.auto] settings")?;

        Ok(RunnerConfig {
            failure_policy: self.runner.failure_policy,
            retries: self.runner.retries,
            adaptive: AdaptiveSampling { rule, max_time_ns },
            pin_cpu: self.runner.pin_cpu,
        })
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Duration must be non-negative: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CelerityConfig::default();
        assert_eq!(config.runner.failure_policy, FailurePolicy::AbortDescriptor);
        assert_eq!(config.runner.retries, 0);
        assert_eq!(config.output.format, "human");
        assert_eq!(config.runner_config().unwrap(), RunnerConfig::default());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(CelerityConfig::parse_duration("3s").unwrap(), 3_000_000_000);
        assert_eq!(CelerityConfig::parse_duration("500ms").unwrap(), 500_000_000);
        assert_eq!(CelerityConfig::parse_duration("100us").unwrap(), 100_000);
        assert_eq!(CelerityConfig::parse_duration("1000ns").unwrap(), 1000);
        assert_eq!(CelerityConfig::parse_duration("2m").unwrap(), 120_000_000_000);
        assert_eq!(CelerityConfig::parse_duration("1.5s").unwrap(), 1_500_000_000);
        assert_eq!(CelerityConfig::parse_duration("7").unwrap(), 7_000_000_000);
        assert!(CelerityConfig::parse_duration("").is_err());
        assert!(CelerityConfig::parse_duration("3 parsecs").is_err());
        assert!(CelerityConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = CelerityConfig::parse(
            r#"
            [runner]
            failure_policy = "skip-sample"
            retries = 2

            [runner.auto]
            max_time = "250ms"
            target_rse = 0.05
        "#,
        )
        .unwrap();

        let runner = config.runner_config().unwrap();
        assert_eq!(runner.failure_policy, FailurePolicy::SkipSample);
        assert_eq!(runner.retries, 2);
        assert_eq!(runner.adaptive.max_time_ns, 250_000_000);
        assert_eq!(runner.adaptive.rule.target_rse, 0.05);
        // Defaults should still apply
        assert_eq!(runner.adaptive.rule.min_samples, DEFAULT_MIN_SAMPLES);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_invalid_auto_settings_rejected() {
        let config = CelerityConfig::parse(
            r#"
            [runner.auto]
            min_samples = 50
            max_samples = 10
        "#,
        )
        .unwrap();
        assert!(config.runner_config().is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(CelerityConfig::parse("[runner]\nfailure_policy = \"retry-forever\"").is_err());
    }
}
