//! Application configuration
//! Backend location, company list and initial date range, loaded from JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "stock_viewer.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A selectable company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Identifier sent as `company_id`.
    pub id: String,
    pub name: String,
    pub symbol: String,
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub csrf_cookie_name: String,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub request_timeout_secs: Option<u64>,
    pub companies: Vec<Company>,
    /// Initial start date, `YYYY-MM-DD`.
    pub earliest_date: Option<String>,
    /// Initial end date, `YYYY-MM-DD`.
    pub latest_date: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            csrf_cookie_name: "csrftoken".to_string(),
            request_timeout_secs: None,
            companies: vec![Company {
                id: "1".to_string(),
                name: "Apple".to_string(),
                symbol: "AAPL".to_string(),
            }],
            earliest_date: Some("2015-01-02".to_string()),
            latest_date: Some("2024-12-31".to_string()),
        }
    }
}

impl AppConfig {
    /// Load config from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `explicit` if given, else from the default file if it
    /// exists, else fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(explicit, Path::new(DEFAULT_CONFIG_FILE))
    }

    fn load_from(explicit: Option<&Path>, default_path: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        if default_path.exists() {
            info!("Loading config from {}", default_path.display());
            Self::from_file(default_path)
        } else {
            info!("No {} found, using defaults", default_path.display());
            Ok(Self::default())
        }
    }
}
