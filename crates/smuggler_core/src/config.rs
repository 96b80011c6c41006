//! Runtime configuration for the release API client.
//!
//! # Responsibility
//! - Hold the repository coordinates and credentials for release access.
//! - Load and validate them from explicit values or environment variables.
//!
//! # Invariants
//! - `owner`, `repo` and `token` are trimmed and never empty.
//! - `api_base_url` always uses an `http` or `https` scheme.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable names read by [`SmugglerConfig::from_env`].
pub mod env_vars {
    pub const OWNER: &str = "SMUGGLER_OWNER";
    pub const REPO: &str = "SMUGGLER_REPO";
    pub const TOKEN: &str = "SMUGGLER_TOKEN";
    /// Used when `SMUGGLER_TOKEN` is not set.
    pub const FALLBACK_TOKEN: &str = "GITHUB_TOKEN";
    pub const API_URL: &str = "SMUGGLER_API_URL";
}

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required value is absent or blank.
    Missing(&'static str),
    /// Value is present but unusable.
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing required config value `{field}`"),
            Self::Invalid { field, message } => {
                write!(f, "invalid config value `{field}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Repository coordinates and credentials for the release API.
#[derive(Clone, PartialEq, Eq)]
pub struct SmugglerConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
    /// REST root, e.g. `https://api.github.com` or an enterprise `/api/v3`.
    pub api_base_url: String,
    pub user_agent: String,
}

impl std::fmt::Debug for SmugglerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmugglerConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl SmugglerConfig {
    /// Creates a configuration targeting the public API.
    pub fn new(
        owner: impl AsRef<str>,
        repo: impl AsRef<str>,
        token: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            owner: required(env_vars::OWNER, Some(owner.as_ref()))?,
            repo: required(env_vars::REPO, Some(repo.as_ref()))?,
            token: required(env_vars::TOKEN, Some(token.as_ref()))?,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: default_user_agent(),
        })
    }

    /// Replaces the API root after validating its scheme.
    pub fn with_api_base_url(mut self, url: impl AsRef<str>) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(url.as_ref())?;
        Ok(self)
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    /// - Returns `ConfigError::Missing` when owner, repo or token is unset.
    /// - Returns `ConfigError::Invalid` when the API URL has no http(s) scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(env_vars::TOKEN)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| lookup(env_vars::FALLBACK_TOKEN));
        let config = Self {
            owner: required(env_vars::OWNER, lookup(env_vars::OWNER).as_deref())?,
            repo: required(env_vars::REPO, lookup(env_vars::REPO).as_deref())?,
            token: required(env_vars::TOKEN, token.as_deref())?,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: default_user_agent(),
        };

        match lookup(env_vars::API_URL) {
            Some(url) if !url.trim().is_empty() => config.with_api_base_url(url),
            _ => Ok(config),
        }
    }
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::Missing(field)),
    }
}

fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        return Ok(trimmed.to_string());
    }
    Err(ConfigError::Invalid {
        field: env_vars::API_URL,
        message: format!("expected an http(s) url, got `{trimmed}`"),
    })
}

fn default_user_agent() -> String {
    format!("smuggler/{}", env!("CARGO_PKG_VERSION"))
}
