//! Dashboard configuration: a TOML file merged with command-line overrides.
//!
//! Lookup order for the file: an explicit `--config` path, then
//! `<config_dir>/movies-dashboard/config.toml` if it exists, else built-in defaults.

use crate::viz::{RenderOptions, Theme};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
pub const APP_NAME: &str = "movies-dashboard";
/// Port the dashboard listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8055;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset CSV; the CLI `--data` flag or `MOVIES_DATA` wins over this.
    pub data_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    /// TrueType font used for chart text.
    pub font_path: Option<PathBuf>,
    pub theme: Theme,
    /// Locale tag for thousands separators (`en`, `de`, ...).
    pub locale: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            font_path: None,
            theme: Theme::Dark,
            locale: "en".into(),
            chart_width: 900,
            chart_height: 500,
        }
    }
}

impl DashboardConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s, path)
    }

    /// Default config file location, whether or not it exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
    }

    /// Load `explicit` if given (it must exist), else the default file when present,
    /// else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("using config {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Rendering options derived from this config.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.chart_width,
            height: self.chart_height,
            theme: self.theme,
            locale: self.locale.clone(),
            font_path: self.font_path.clone(),
        }
    }
}
