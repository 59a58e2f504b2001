//! Configuration for flow finding and pattern extraction.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with MBQC_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use mbqc_ir::AlgorithmBackend;

/// Which flow searches to run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSearch {
    /// Try causal flow first, fall back to gflow.
    #[default]
    CausalThenGflow,
    /// Causal flow only.
    CausalOnly,
    /// Gflow only.
    GflowOnly,
}

/// When nodes are prepared and entangled in the extracted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparationStrategy {
    /// Prepare and entangle each node just before it is first needed.
    #[default]
    Lazy,
    /// Prepare every node and apply every entangle before the first measurement.
    Upfront,
}

/// How byproduct corrections appear in the extracted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMode {
    /// One `Correct` command per byproduct.
    #[default]
    Explicit,
    /// Corrections on measured nodes are folded into signal domains.
    Folded,
}

/// Complete flow and extraction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Graph algorithms implementation.
    #[serde(default)]
    pub backend: AlgorithmBackend,

    /// Flow searches to run.
    #[serde(default)]
    pub search: FlowSearch,

    /// Upper bound on search rounds; `None` searches exhaustively.
    #[serde(default)]
    pub max_layers: Option<usize>,

    /// Preparation strategy for extraction.
    #[serde(default)]
    pub preparation: PreparationStrategy,

    /// Correction mode for extraction.
    #[serde(default)]
    pub corrections: CorrectionMode,
}

impl FlowConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: FlowConfig =
            serde_yaml_ng::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        FlowConfig::default().with_env_overrides()
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => FlowConfig::default(),
        };
        config.with_env_overrides()
    }

    /// Apply `MBQC_*` environment variables to this configuration.
    ///
    /// Only variables that are set override the current values.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Keys are the environment variable names (`MBQC_BACKEND`,
    /// `MBQC_SEARCH`, `MBQC_MAX_LAYERS`, `MBQC_PREPARATION`,
    /// `MBQC_CORRECTIONS`). An unparsable value is an error.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("MBQC_BACKEND") {
            self.backend = parse_var("MBQC_BACKEND", &v)?;
        }
        if let Some(v) = lookup("MBQC_SEARCH") {
            self.search = parse_var("MBQC_SEARCH", &v)?;
        }
        if let Some(v) = lookup("MBQC_MAX_LAYERS") {
            self.max_layers = match v.trim() {
                "" | "none" | "unbounded" => None,
                n => Some(parse_var("MBQC_MAX_LAYERS", n)?),
            };
        }
        if let Some(v) = lookup("MBQC_PREPARATION") {
            self.preparation = parse_var("MBQC_PREPARATION", &v)?;
        }
        if let Some(v) = lookup("MBQC_CORRECTIONS") {
            self.corrections = parse_var("MBQC_CORRECTIONS", &v)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_layers == Some(0) {
            return Err(ConfigError::Invalid(
                "max_layers must be greater than 0; omit it for an exhaustive search".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{key}: {e}")))
}

impl FromStr for FlowSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "causal_then_gflow" | "auto" => Ok(FlowSearch::CausalThenGflow),
            "causal_only" | "causal" => Ok(FlowSearch::CausalOnly),
            "gflow_only" | "gflow" => Ok(FlowSearch::GflowOnly),
            other => Err(format!(
                "unknown flow search '{other}' (expected 'causal_then_gflow', 'causal_only' or 'gflow_only')"
            )),
        }
    }
}

impl FromStr for PreparationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(PreparationStrategy::Lazy),
            "upfront" => Ok(PreparationStrategy::Upfront),
            other => Err(format!(
                "unknown preparation strategy '{other}' (expected 'lazy' or 'upfront')"
            )),
        }
    }
}

impl FromStr for CorrectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(CorrectionMode::Explicit),
            "folded" => Ok(CorrectionMode::Folded),
            other => Err(format!(
                "unknown correction mode '{other}' (expected 'explicit' or 'folded')"
            )),
        }
    }
}

impl fmt::Display for FlowSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowSearch::CausalThenGflow => f.write_str("causal_then_gflow"),
            FlowSearch::CausalOnly => f.write_str("causal_only"),
            FlowSearch::GflowOnly => f.write_str("gflow_only"),
        }
    }
}

impl fmt::Display for PreparationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreparationStrategy::Lazy => f.write_str("lazy"),
            PreparationStrategy::Upfront => f.write_str("upfront"),
        }
    }
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionMode::Explicit => f.write_str("explicit"),
            CorrectionMode::Folded => f.write_str("folded"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = FlowConfig::default();
        assert_eq!(config.backend, AlgorithmBackend::Native);
        assert_eq!(config.search, FlowSearch::CausalThenGflow);
        assert_eq!(config.max_layers, None);
        assert_eq!(config.preparation, PreparationStrategy::Lazy);
        assert_eq!(config.corrections, CorrectionMode::Explicit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_document() {
        let config = FlowConfig::from_yaml_str("search: gflow_only\nmax_layers: 8\n").unwrap();
        assert_eq!(config.search, FlowSearch::GflowOnly);
        assert_eq!(config.max_layers, Some(8));
        assert_eq!(config.preparation, PreparationStrategy::Lazy);
    }

    #[test]
    fn test_yaml_full_document() {
        let yaml = "\
backend: accelerated
search: causal_only
preparation: upfront
corrections: folded
";
        let config = FlowConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.backend, AlgorithmBackend::Accelerated);
        assert_eq!(config.search, FlowSearch::CausalOnly);
        assert_eq!(config.preparation, PreparationStrategy::Upfront);
        assert_eq!(config.corrections, CorrectionMode::Folded);
    }

    #[test]
    fn test_yaml_errors() {
        assert!(matches!(
            FlowConfig::from_yaml_str("search: sideways\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            FlowConfig::from_yaml_str("max_layers: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FlowConfig::from_file("/nonexistent/mbqc.yaml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let base = FlowConfig::from_yaml_str("search: gflow_only\nmax_layers: 4\n").unwrap();
        let config = base
            .with_overrides(lookup(&[
                ("MBQC_SEARCH", "causal"),
                ("MBQC_MAX_LAYERS", "none"),
                ("MBQC_CORRECTIONS", "Folded"),
            ]))
            .unwrap();
        assert_eq!(config.search, FlowSearch::CausalOnly);
        assert_eq!(config.max_layers, None);
        assert_eq!(config.corrections, CorrectionMode::Folded);
        // untouched
        assert_eq!(config.preparation, PreparationStrategy::Lazy);
    }

    #[test]
    fn test_overrides_reject_bad_values() {
        let err = FlowConfig::default()
            .with_overrides(lookup(&[("MBQC_BACKEND", "gpu")]))
            .unwrap_err();
        assert!(err.to_string().contains("MBQC_BACKEND"));

        assert!(FlowConfig::default()
            .with_overrides(lookup(&[("MBQC_MAX_LAYERS", "0")]))
            .is_err());
        assert!(FlowConfig::default()
            .with_overrides(lookup(&[("MBQC_MAX_LAYERS", "many")]))
            .is_err());
    }
}
