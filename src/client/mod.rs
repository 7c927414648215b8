//! Prediction service integration
//!
//! Sends an MNIST pixel vector to an external HTTP service and decodes the
//! classification it returns. The service itself lives elsewhere; this module
//! knows its predict, batch, health and metrics routes.

mod client;
pub mod config;
pub mod models;

pub use client::{PredictionClient, Predictor};
pub use config::ClientConfig;
pub use models::{
    format_percent, BatchPredictionResponse, HealthStatus, MetricsResponse, Prediction,
    MAX_BATCH_SIZE,
};

use crate::errors::Result;

/// Build a client from startup configuration
pub fn from_startup(
    config_file: Option<&std::path::Path>,
    cli_endpoint: Option<&str>,
) -> Result<PredictionClient> {
    PredictionClient::new(ClientConfig::load(config_file, cli_endpoint)?)
}
