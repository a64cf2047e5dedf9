// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::{BaseUrl, ConsistencyPolicy};

pub const DEFAULT_API_BASE: &str = "http://localhost:5001";
const API_URL_OVERRIDE: &str = "MATCHER_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Absolute URL, or a path served behind a reverse proxy on `origin`
    pub api_base: String,
    #[serde(default)]
    pub origin: Option<String>,
    /// Unset means no client-side timeout
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub consistency: ConsistencyPolicy,
    /// Optional JSON log file in addition to stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            origin: None,
            timeout_seconds: None,
            consistency: ConsistencyPolicy::default(),
            log_file: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    #[serde(default)]
    production: Option<EnvironmentConfig>,
}

/// What [`EnvironmentConfig::load`] decided. Loading happens before the
/// subscriber exists, so the caller logs these afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadNotes {
    pub environment: String,
    pub config_path: PathBuf,
    pub file_found: bool,
    pub api_override: Option<String>,
}

impl LoadNotes {
    pub fn log(&self) {
        info!("Loading configuration for environment: {}", self.environment);
        if self.file_found {
            info!("Configuration file: {}", self.config_path.display());
        } else {
            info!(
                "{} not found, using defaults ({})",
                self.config_path.display(),
                DEFAULT_API_BASE
            );
        }
        if let Some(api_base) = &self.api_override {
            info!("{} overrides api_base: {}", API_URL_OVERRIDE, api_base);
        }
    }
}

impl EnvironmentConfig {
    /// Load configuration based on environment. A missing file means local
    /// defaults; `MATCHER_API_URL` overrides the base in either case.
    pub fn load(config_path: &Path) -> Result<(Self, LoadNotes)> {
        Self::load_with(
            config_path,
            Self::get_environment(),
            std::env::var(API_URL_OVERRIDE).ok(),
        )
    }

    fn load_with(
        config_path: &Path,
        environment: String,
        api_override: Option<String>,
    ) -> Result<(Self, LoadNotes)> {
        let file_found = config_path.exists();

        let mut config = if file_found {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml_str(&content, &environment)?
        } else {
            Self::default()
        };

        if let Some(api_base) = &api_override {
            config.api_base = api_base.clone();
        }

        let notes = LoadNotes {
            environment,
            config_path: config_path.to_path_buf(),
            file_found,
            api_override,
        };
        Ok((config, notes))
    }

    fn get_environment() -> String {
        std::env::var("RESUME_MATCHER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn from_yaml_str(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        match environment {
            "production" => config_file
                .production
                .context("config.yaml has no 'production' section"),
            _ => Ok(config_file.local),
        }
    }

    pub fn base_url(&self) -> Result<BaseUrl> {
        BaseUrl::parse(&self.api_base, self.origin.as_deref())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  api_base: http://localhost:5001
production:
  api_base: /api
  origin: https://matcher.example.com
  timeout_seconds: 60
  consistency: latest_request_wins
"#;

    #[test]
    fn test_local_section() {
        let config = EnvironmentConfig::from_yaml_str(SAMPLE, "local").unwrap();
        assert_eq!(config.api_base, "http://localhost:5001");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.consistency, ConsistencyPolicy::LastResponseWins);
    }

    #[test]
    fn test_production_section_resolves_relative_base() {
        let config = EnvironmentConfig::from_yaml_str(SAMPLE, "production").unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.consistency, ConsistencyPolicy::LatestRequestWins);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://matcher.example.com/api"
        );
    }

    #[test]
    fn test_missing_production_section() {
        let content = "local:\n  api_base: http://localhost:5001\n";
        assert!(EnvironmentConfig::from_yaml_str(content, "production").is_err());
    }

    #[test]
    fn test_relative_base_without_origin_is_rejected() {
        let config = EnvironmentConfig {
            api_base: "/api".to_string(),
            ..Default::default()
        };
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let (config, notes) =
            EnvironmentConfig::load_with(&path, "production".to_string(), None).unwrap();
        assert_eq!(config.api_base, "/api");
        assert!(notes.file_found);
        assert_eq!(notes.environment, "production");
        assert_eq!(notes.api_override, None);
    }

    #[test]
    fn test_missing_file_and_override_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let (config, notes) = EnvironmentConfig::load_with(
            &path,
            "local".to_string(),
            Some("http://matcher.internal:9000".to_string()),
        )
        .unwrap();
        assert_eq!(config.api_base, "http://matcher.internal:9000");
        assert!(!notes.file_found);
        assert_eq!(notes.config_path, path);
        assert_eq!(
            notes.api_override.as_deref(),
            Some("http://matcher.internal:9000")
        );
    }
}
