//! Configuration loading for the back-office console.
//!
//! All top-level fields are required unless marked optional. Per-resource
//! sections are optional; a missing section keeps the production routes and
//! the screen's default page size.

use backoffice_client::{
    ClientSettings, Credentials, EndpointOverrides, ResourceEndpoints, DASHBOARD_PATH,
};
use backoffice_core::ResourceKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "BACKOFFICE_TUI_CONFIG";

/// Theme names accepted by `theme.name`.
pub const THEMES: &[&str] = &["synthbrute", "classic"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    #[serde(default)]
    pub auth: Credentials,
    pub request_timeout_ms: u64,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
    pub export_dir: PathBuf,
    pub theme: ThemeConfig,
    /// Path of the overview document, relative to `api_base_url`.
    #[serde(default)]
    pub dashboard_route: Option<String>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

/// `[resources.<key>]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub routes: EndpointOverrides,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or BACKOFFICE_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.to_string(),
    }
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(invalid("persistence_path", "must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        if self.export_dir.as_os_str().is_empty() {
            return Err(invalid("export_dir", "must not be empty"));
        }
        if self.theme.name.trim().is_empty() {
            return Err(invalid("theme.name", "must not be empty"));
        }
        if !THEMES.contains(&self.theme.name.to_ascii_lowercase().as_str()) {
            return Err(invalid("theme.name", "must be 'synthbrute' or 'classic'"));
        }
        if self
            .dashboard_route
            .as_deref()
            .is_some_and(|route| route.trim().is_empty())
        {
            return Err(invalid("dashboard_route", "must not be empty"));
        }
        for (key, resource) in &self.resources {
            if ResourceKind::from_key(key).is_none() {
                return Err(invalid(format!("resources.{}", key), "unknown resource"));
            }
            if resource.page_size == Some(0) {
                return Err(invalid(format!("resources.{}.page_size", key), "must be > 0"));
            }
        }
        Ok(())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base_url.clone(),
            credentials: self.auth.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn dashboard_route(&self) -> &str {
        self.dashboard_route.as_deref().unwrap_or(DASHBOARD_PATH)
    }

    /// Production routes with this resource's overrides applied.
    pub fn endpoints(&self, kind: ResourceKind) -> ResourceEndpoints {
        let endpoints = ResourceEndpoints::defaults(kind);
        match self.resources.get(kind.key()) {
            Some(resource) => endpoints.with_overrides(&resource.routes),
            None => endpoints,
        }
    }

    pub fn page_size(&self, kind: ResourceKind) -> NonZeroUsize {
        self.resources
            .get(kind.key())
            .and_then(|resource| resource.page_size)
            .and_then(NonZeroUsize::new)
            .unwrap_or_else(|| default_page_size(kind))
    }
}

/// Mentors are listed five to a page; every other screen shows ten.
pub fn default_page_size(kind: ResourceKind) -> NonZeroUsize {
    match kind {
        ResourceKind::Mentor => NonZeroUsize::MIN.saturating_add(4),
        _ => NonZeroUsize::MIN.saturating_add(9),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
