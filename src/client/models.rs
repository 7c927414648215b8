//! Wire types for the prediction service

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canvas::PixelVector;

/// Body of `POST <endpoint>`
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest<'a> {
    pub pixel_values: &'a PixelVector,
}

/// Most images the batch route accepts in one request
pub const MAX_BATCH_SIZE: usize = 10;

/// Body of `POST <endpoint>/batch`
#[derive(Debug, Clone, Serialize)]
pub struct BatchPredictRequest<'a> {
    pub images: &'a [PixelVector],
}

/// Successful answer from the predict route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most likely digit, 0-9
    #[serde(rename = "prediction")]
    pub predicted_digit: u8,
    /// Probability of `predicted_digit`, 0-1
    pub confidence: f64,
    /// Probability per digit, keyed "0".."9"
    pub probabilities: BTreeMap<String, f64>,
    pub inference_time_ms: f64,
    pub request_id: String,
}

impl Prediction {
    /// Confidence as a percentage with one decimal, e.g. "97.3"
    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence)
    }

    /// Probability for a single digit, if the server reported it
    pub fn probability(&self, digit: u8) -> Option<f64> {
        self.probabilities.get(&digit.to_string()).copied()
    }

    /// Digits sorted by probability, highest first
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .probabilities
            .iter()
            .map(|(digit, p)| (digit.clone(), *p))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

/// Format a 0-1 probability as a percentage with one decimal
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}", probability * 100.0)
}

/// Answer from the health route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub model_loaded: bool,
    #[serde(default)]
    pub model_info: serde_json::Map<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

/// Answer from the batch route; predictions are in request order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<Prediction>,
    pub batch_size: usize,
    pub total_inference_time_ms: f64,
    pub average_inference_time_ms: f64,
    pub request_id: String,
}

/// Usage counters from the metrics route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub total_predictions: u64,
    pub successful_predictions: u64,
    pub failed_predictions: u64,
    /// Successful / total, 0-1
    pub success_rate: f64,
    /// Milliseconds
    pub average_inference_time: f64,
    /// Count per predicted digit, keyed "0".."9"
    #[serde(default)]
    pub predictions_by_class: BTreeMap<String, u64>,
}

impl MetricsResponse {
    /// Digit the server has predicted most often
    pub fn most_predicted(&self) -> Option<(&str, u64)> {
        self.predictions_by_class
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(digit, count)| (digit.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "prediction": 7,
            "confidence": 0.9731,
            "probabilities": {
                "0": 0.001, "1": 0.002, "2": 0.003, "3": 0.001, "4": 0.0,
                "5": 0.0009, "6": 0.0, "7": 0.9731, "8": 0.012, "9": 0.007
            },
            "inference_time_ms": 1.84,
            "request_id": "5f0c3a52-0f0e-4c3b-9d1e-0e8b2a6f4d11"
        })
    }

    #[test]
    fn test_prediction_decodes_wire_format() {
        let prediction: Prediction = serde_json::from_value(sample()).unwrap();
        assert_eq!(prediction.predicted_digit, 7);
        assert_eq!(prediction.confidence_percent(), "97.3");
        assert_eq!(prediction.probability(8), Some(0.012));
        assert_eq!(prediction.probabilities.len(), 10);
    }

    #[test]
    fn test_prediction_serializes_back_to_wire_names() {
        let prediction: Prediction = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(&prediction).unwrap();
        assert_eq!(value["prediction"], 7);
        assert!(value.get("predicted_digit").is_none());
    }

    #[test]
    fn test_ranked() {
        let prediction: Prediction = serde_json::from_value(sample()).unwrap();
        let ranked = prediction.ranked();
        assert_eq!(ranked[0].0, "7");
        assert_eq!(ranked[1].0, "8");
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("request_id");
        assert!(serde_json::from_value::<Prediction>(value).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let pixels = crate::canvas::extract(&crate::canvas::Grid::new());
        let body = serde_json::to_value(PredictRequest {
            pixel_values: &pixels,
        })
        .unwrap();
        assert_eq!(body["pixel_values"].as_array().map(Vec::len), Some(784));
    }

    #[test]
    fn test_batch_response_decodes() {
        let response: BatchPredictionResponse = serde_json::from_value(json!({
            "predictions": [sample(), sample()],
            "batch_size": 2,
            "total_inference_time_ms": 4.1,
            "average_inference_time_ms": 2.05,
            "request_id": "batch-1"
        }))
        .unwrap();
        assert_eq!(response.predictions.len(), 2);
        assert_eq!(response.predictions[1].predicted_digit, 7);
    }

    #[test]
    fn test_metrics_most_predicted() {
        let metrics: MetricsResponse = serde_json::from_value(json!({
            "total_predictions": 12,
            "successful_predictions": 11,
            "failed_predictions": 1,
            "success_rate": 0.9167,
            "average_inference_time": 2.4,
            "predictions_by_class": {"1": 4, "3": 4, "7": 3}
        }))
        .unwrap();
        assert_eq!(metrics.most_predicted(), Some(("1", 4)));

        let empty = MetricsResponse {
            predictions_by_class: BTreeMap::new(),
            ..metrics
        };
        assert_eq!(empty.most_predicted(), None);
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "healthy",
            "timestamp": "2026-10-19 12:00:00",
            "model_loaded": true,
            "model_info": {"parameters": 109386}
        }))
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.model_info["parameters"], 109386);
    }
}
