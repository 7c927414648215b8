//! # MNIST Canvas
//!
//! Sketch a digit on a 28x28 grid, export it as a 784-value MNIST vector and
//! ask an external prediction service which digit it is.
//!
//! - [`canvas`] - grid, brush rasterizer and exporter
//! - [`client`] - HTTP client for the prediction service
//! - [`session`] - draw / extract / predict state machine
//! - [`tui`] - terminal front end

pub mod canvas;
pub mod client;
pub mod errors;
pub mod session;
pub mod tui;

pub use canvas::{Grid, PixelVector, Point, Surface, GRID_SIZE, PIXEL_COUNT};
pub use client::{ClientConfig, Prediction, PredictionClient, Predictor};
pub use errors::{CanvasError, Result, ValidationError};
pub use session::{Session, SessionState, Submission};
