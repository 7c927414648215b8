//! Local stand-in for the prediction server
#![allow(dead_code)]

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use tiny_http::{Header, Response, Server};

pub const PREDICTION_BODY: &str = r#"{
    "prediction": 3,
    "confidence": 0.8812,
    "probabilities": {
        "0": 0.001, "1": 0.01, "2": 0.02, "3": 0.8812, "4": 0.003,
        "5": 0.05, "6": 0.002, "7": 0.01, "8": 0.02, "9": 0.0028
    },
    "inference_time_ms": 3.2,
    "request_id": "0d4b7b6e-8d4f-4f6c-9a39-4f2d1c7d5e10"
}"#;

pub const HEALTH_BODY: &str = r#"{
    "status": "healthy",
    "timestamp": "2026-10-19 09:30:00",
    "model_loaded": true,
    "model_info": {"architecture": "mlp"}
}"#;

pub const METRICS_BODY: &str = r#"{
    "total_predictions": 42,
    "successful_predictions": 40,
    "failed_predictions": 2,
    "success_rate": 0.9524,
    "average_inference_time": 2.731,
    "predictions_by_class": {"0": 3, "1": 9, "3": 14, "7": 14}
}"#;

pub const BATCH_BODY: &str = r#"{
    "predictions": [
        {
            "prediction": 1,
            "confidence": 0.97,
            "probabilities": {"1": 0.97, "7": 0.03},
            "inference_time_ms": 1.1,
            "request_id": "7c1e-0"
        },
        {
            "prediction": 7,
            "confidence": 0.91,
            "probabilities": {"1": 0.09, "7": 0.91},
            "inference_time_ms": 1.2,
            "request_id": "7c1e-1"
        }
    ],
    "batch_size": 2,
    "total_inference_time_ms": 2.3,
    "average_inference_time_ms": 1.15,
    "request_id": "7c1e"
}"#;

/// What the mock server saw
#[derive(Debug)]
pub struct Captured {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// Serve `status` + `body` to every request; returns the base URL and a
/// receiver of captured requests
pub fn spawn_server(status: u16, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut received = String::new();
            let _ = request.as_reader().read_to_string(&mut received);
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.to_string());
            let _ = tx.send(Captured {
                method: request.method().to_string(),
                url: request.url().to_string(),
                content_type,
                body: received,
            });

            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header("Content-Type: application/json".parse::<Header>().unwrap());
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{port}"), rx)
}

/// A URL on a port nothing listens on
pub fn dead_endpoint() -> String {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    format!("http://127.0.0.1:{port}/predict")
}
