// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for accessfix

use crate::aggregate::ScoringConfig;
use crate::document::ParserStrategy;
use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Parser and rule selection
    #[serde(default)]
    pub engine: EngineConfig,

    /// Points deducted per severity
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Document sources
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Rule engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Parser backend selection
    #[serde(default)]
    pub parser: ParserStrategy,

    /// Rule ids to skip
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Recoveries the tree parser may make before giving up on a document
    #[serde(default = "default_max_parse_errors")]
    pub max_parse_errors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parser: ParserStrategy::default(),
            disabled_rules: Vec::new(),
            max_parse_errors: default_max_parse_errors(),
        }
    }
}

/// Loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Overall scan timeout in seconds (fetch, parse and rules)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// GitHub API base URL
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// File extensions scanned in directory mode
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names skipped in directory mode
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            github_api_url: default_github_api_url(),
            extensions: default_extensions(),
            skip_dirs: default_skip_dirs(),
        }
    }
}

impl LoaderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_max_parse_errors() -> usize {
    10_000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "accessfix".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["html".to_string(), "htm".to_string()]
}

fn default_skip_dirs() -> Vec<String> {
    ["node_modules", ".git", "target", "dist", "build", "vendor"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ScanError::Config(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let weights = [self.scoring.critical, self.scoring.warning, self.scoring.info];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ScanError::Config(
                "scoring weights must be finite and non-negative".to_string(),
            ));
        }
        if self.loader.timeout_secs == 0 {
            return Err(ScanError::Config("loader.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.parser, ParserStrategy::Auto);
        assert_eq!(config.scoring.critical, 10.0);
        assert_eq!(config.loader.timeout(), Duration::from_secs(30));
        assert!(config.loader.extensions.contains(&"html".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [engine]
            parser = "text"
            disabled_rules = ["table-caption"]

            [scoring]
            info = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.parser, ParserStrategy::Text);
        assert_eq!(config.engine.disabled_rules, vec!["table-caption"]);
        assert_eq!(config.engine.max_parse_errors, 10_000);
        assert_eq!(config.scoring.info, 0.5);
        assert_eq!(config.scoring.warning, 5.0);
        assert_eq!(config.loader.github_api_url, "https://api.github.com");
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            Config::from_toml("[scoring]\ncritical = -1.0"),
            Err(ScanError::Config(_))
        ));
        assert!(matches!(Config::from_toml("[engine]\nparser = \"dom\""), Err(ScanError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accessfix.toml");
        std::fs::write(&path, "[loader]\ntimeout_secs = 5\n").unwrap();
        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.loader.timeout_secs, 5);
        assert!(Config::load_or_default(None).is_ok());
    }
}
