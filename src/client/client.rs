//! HTTP client for the prediction service

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::config::ClientConfig;
use super::models::{
    BatchPredictRequest, BatchPredictionResponse, HealthStatus, MetricsResponse,
    PredictRequest, Prediction, MAX_BATCH_SIZE,
};
use crate::canvas::PixelVector;
use crate::errors::{CanvasError, Result, ValidationError};

/// Anything that can turn a pixel vector into a prediction
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, pixels: &PixelVector) -> Result<Prediction>;
}

/// Prediction service client
///
/// One request per call, no retries: failures go straight back to the caller.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    config: ClientConfig,
    endpoint: Url,
}

impl PredictionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("mnist-canvas/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                CanvasError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        info!("Prediction client initialized for {}", endpoint);

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ask the server's health route whether a model is loaded
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.config.health_url()?;
        debug!("Checking health at {}", url);
        self.get_json(url).await
    }

    /// Fetch the server's usage counters
    pub async fn metrics(&self) -> Result<MetricsResponse> {
        let url = self.config.metrics_url()?;
        debug!("Fetching metrics from {}", url);
        self.get_json(url).await
    }

    /// Classify up to [`MAX_BATCH_SIZE`] vectors in one request
    ///
    /// Batch size is checked before anything is sent.
    pub async fn predict_batch(&self, images: &[PixelVector]) -> Result<BatchPredictionResponse> {
        if images.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        if images.len() > MAX_BATCH_SIZE {
            return Err(ValidationError::BatchTooLarge {
                size: images.len(),
                max: MAX_BATCH_SIZE,
            }
            .into());
        }

        let url = self.config.batch_url()?;
        let started = Instant::now();
        debug!("Submitting batch of {} images to {}", images.len(), url);

        let response = self
            .client
            .post(url)
            .json(&BatchPredictRequest { images })
            .send()
            .await
            .map_err(|e| CanvasError::Network(e.to_string()))?;

        let batch: BatchPredictionResponse = Self::decode(response).await?;
        if batch.predictions.len() != images.len() {
            return Err(CanvasError::InvalidResponse(format!(
                "sent {} images but received {} predictions",
                images.len(),
                batch.predictions.len()
            )));
        }

        info!(
            "Batch {}: {} predictions round_trip={:?}",
            batch.request_id,
            batch.predictions.len(),
            started.elapsed()
        );
        Ok(batch)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CanvasError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    /// Check the status, then decode the body as `T`
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| CanvasError::Network(format!("Failed to read response: {e}")))?;

        serde_json::from_str(&text)
            .map_err(|e| CanvasError::InvalidResponse(format!("{e}. Response body: {text}")))
    }

    /// Map non-2xx responses to a server error, logging the body
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Prediction server responded with status {}", status);
        debug!("Error body: {}", body);
        Err(CanvasError::Server {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, pixels: &PixelVector) -> Result<Prediction> {
        let started = Instant::now();
        debug!("Submitting {} pixel values to {}", pixels.len(), self.endpoint);

        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequest {
                pixel_values: pixels,
            })
            .send()
            .await
            .map_err(|e| CanvasError::Network(e.to_string()))?;

        let prediction: Prediction = Self::decode(response).await?;

        info!(
            "Prediction {}: digit={} confidence={:.4} round_trip={:?}",
            prediction.request_id,
            prediction.predicted_digit,
            prediction.confidence,
            started.elapsed()
        );

        Ok(prediction)
    }
}
