//! Configuration for the prediction client

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CanvasError, Result};

/// Primary endpoint variable
pub const ENDPOINT_ENV: &str = "MNIST_PREDICTION_URL";
/// Endpoint variable accepted for compatibility with the web frontend's naming
pub const LEGACY_ENDPOINT_ENV: &str = "PREDICTION_SERVER_URL";
pub const TIMEOUT_ENV: &str = "MNIST_PREDICTION_TIMEOUT_SECONDS";

/// Configuration for the prediction client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the predict route, e.g. `http://localhost:8000/predict`
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_seconds: 30,
        }
    }
}

/// On-disk settings; every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CanvasError::Configuration(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| CanvasError::Configuration(format!("Invalid TOML config: {e}")))
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "mnist-canvas", "mnist-canvas")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration once at startup
    ///
    /// Precedence, lowest to highest: config file, environment, `cli_endpoint`.
    pub fn load(config_file: Option<&Path>, cli_endpoint: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        let path = config_file.map(Path::to_path_buf).or_else(Self::config_path);
        if let Some(path) = path.filter(|p| p.exists()) {
            debug!("Loading config from {}", path.display());
            config.apply_file(FileConfig::from_path(&path)?);
        }

        config.apply_env();

        if let Some(endpoint) = cli_endpoint {
            config.endpoint = endpoint.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(endpoint) = file.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(timeout) = file.timeout_seconds {
            self.timeout_seconds = timeout;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(endpoint) = env::var(ENDPOINT_ENV).or_else(|_| env::var(LEGACY_ENDPOINT_ENV)) {
            self.endpoint = endpoint;
        }

        if let Ok(timeout) = env::var(TIMEOUT_ENV) {
            self.timeout_seconds = timeout.parse().unwrap_or(self.timeout_seconds);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(CanvasError::Configuration(format!(
                "Prediction endpoint not set. Set {ENDPOINT_ENV} or pass --endpoint"
            )));
        }

        let url = self.endpoint_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CanvasError::Configuration(format!(
                "Unsupported endpoint scheme: {}",
                url.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(CanvasError::Configuration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed endpoint URL
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(self.endpoint.trim())
            .map_err(|e| CanvasError::Configuration(format!("Invalid endpoint URL: {e}")))
    }

    /// Health route, mounted beside the predict route
    ///
    /// `http://host/predict` gives `http://host/health`, and a prefixed
    /// `http://host/api/v1/predict` gives `http://host/api/v1/health`.
    pub fn health_url(&self) -> Result<Url> {
        self.sibling_url("health")
    }

    /// Usage metrics route, mounted beside the predict route
    pub fn metrics_url(&self) -> Result<Url> {
        self.sibling_url("metrics")
    }

    /// Batch route, nested under the predict route (`/predict/batch`)
    pub fn batch_url(&self) -> Result<Url> {
        let mut url = self.endpoint_url()?;
        let path = format!("{}/batch", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.set_query(None);
        Ok(url)
    }

    fn sibling_url(&self, route: &str) -> Result<Url> {
        let mut url = self.endpoint_url()?;
        let path = url.path().trim_end_matches('/');
        let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
        let path = format!("{parent}/{route}");
        url.set_path(&path);
        url.set_query(None);
        Ok(url)
    }
}
