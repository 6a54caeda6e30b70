use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::github::DEFAULT_API_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting `{0}` (set it in .pr-report.toml or on the command line)")]
    Missing(&'static str),
}

/// Top-level configuration loaded from .pr-report.toml.
///
/// Every field is optional in the file; the required ones may come from the
/// command line instead and are checked by [`Config::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub-specific settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Repositories processed when no --repos are given
    #[serde(default)]
    pub repos: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Owner of the repositories
    pub organization: Option<String>,
    /// REST API base URL; GraphQL is served from `{api_url}/graphql`
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Base branch a pull request must target to be reported
    pub release_branch: Option<String>,
    /// Directory for markdown reports; terminal output when unset
    pub output_dir: Option<PathBuf>,
}

/// Values given on the command line. They take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub organization: Option<String>,
    pub release_branch: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub repos: Vec<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub organization: String,
    pub api_url: String,
    pub release_branch: String,
    pub output_dir: Option<PathBuf>,
    pub repos: Vec<String>,
}

impl Config {
    /// Load configuration from .pr-report.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-report.toml");
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Merge command line overrides over the file values and check that
    /// everything the pipeline needs is present.
    pub fn resolve(self, overrides: Overrides) -> Result<Settings, ConfigError> {
        let token = overrides
            .token
            .or(self.github.token)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("github.token"))?;
        let organization = overrides
            .organization
            .or(self.github.organization)
            .ok_or(ConfigError::Missing("github.organization"))?;
        let release_branch = overrides
            .release_branch
            .or(self.report.release_branch)
            .ok_or(ConfigError::Missing("report.release_branch"))?;
        let repos = if overrides.repos.is_empty() {
            self.repos
        } else {
            overrides.repos
        };
        if repos.is_empty() {
            return Err(ConfigError::Missing("repos"));
        }

        Ok(Settings {
            token,
            organization,
            api_url: self
                .github
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            release_branch,
            output_dir: overrides.output_dir.or(self.report.output_dir),
            repos,
        })
    }
}
