//! Drawing session lifecycle
//!
//! ```text
//!   Empty ──paint──► Drawing ──extract──► Extracted ──submit──► Predicting
//!                       ▲                     │                    │
//!                       └──────paint──────────┤            ┌───────┴────────┐
//!                                             │            ▼                ▼
//!                                             └──paint── Predicted  PredictionFailed
//!
//!   clear: any state ──► Empty
//! ```
//!
//! Every grid mutation bumps a revision counter. An extracted vector and a
//! prediction both belong to the revision they were made from; painting or
//! clearing drops them, and a response arriving for an older revision is
//! discarded.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::canvas::{self, Grid, PixelVector, Point, Stroke, Surface};
use crate::client::{Prediction, Predictor};
use crate::errors::{CanvasError, Result, ValidationError};

/// Where the session is in the draw / extract / predict cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Drawing,
    Extracted,
    Predicting,
    Predicted,
    PredictionFailed,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Drawing => "drawing",
            SessionState::Extracted => "extracted",
            SessionState::Predicting => "predicting",
            SessionState::Predicted => "predicted",
            SessionState::PredictionFailed => "failed",
        }
    }
}

/// A prediction request handed out by [`Session::begin_prediction`]
#[derive(Debug, Clone)]
pub struct Submission {
    pub pixels: PixelVector,
    /// Grid revision the pixels were extracted from
    pub revision: u64,
}

/// One interactive drawing session
#[derive(Debug, Default)]
pub struct Session {
    grid: Grid,
    state: SessionState,
    pixels: Option<PixelVector>,
    prediction: Option<Prediction>,
    predicted_at: Option<DateTime<Local>>,
    error: Option<CanvasError>,
    has_drawing: bool,
    gesture_active: bool,
    in_flight: bool,
    revision: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pixels(&self) -> Option<&PixelVector> {
        self.pixels.as_ref()
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn predicted_at(&self) -> Option<DateTime<Local>> {
        self.predicted_at
    }

    pub fn error(&self) -> Option<&CanvasError> {
        self.error.as_ref()
    }

    pub fn has_drawing(&self) -> bool {
        self.has_drawing
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    /// True while a request is outstanding
    pub fn is_pending(&self) -> bool {
        self.in_flight
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Extract is offered once something has been drawn
    pub fn can_extract(&self) -> bool {
        self.has_drawing
    }

    /// Predict is offered when a fresh vector exists and nothing is in flight
    pub fn can_predict(&self) -> bool {
        self.pixels.is_some() && !self.in_flight
    }

    /// Press / touch-start: start a gesture and paint where it began
    ///
    /// A press outside the surface does not start a gesture.
    pub fn begin_gesture(&mut self, surface: &Surface, point: Point) -> Option<Stroke> {
        if !surface.contains(point) {
            return None;
        }
        self.gesture_active = true;
        self.paint(surface, point)
    }

    /// Move while pressed. Leaving the surface ends the gesture.
    pub fn move_gesture(&mut self, surface: &Surface, point: Point) -> Option<Stroke> {
        if !self.gesture_active {
            return None;
        }
        if !surface.contains(point) {
            self.end_gesture();
            return None;
        }
        self.paint(surface, point)
    }

    /// Release, leave, touch-end and touch-cancel all land here
    pub fn end_gesture(&mut self) {
        self.gesture_active = false;
    }

    /// Apply one paint event
    ///
    /// Any paint that hits the grid invalidates the extracted vector and the
    /// prediction, even if the cell value did not change.
    pub fn paint(&mut self, surface: &Surface, point: Point) -> Option<Stroke> {
        let stroke = canvas::paint(&mut self.grid, surface, point)?;

        self.revision += 1;
        self.has_drawing = true;
        if self.pixels.take().is_some() {
            debug!("Grid changed, discarding extracted pixel vector");
        }
        self.prediction = None;
        self.predicted_at = None;
        self.state = SessionState::Drawing;

        Some(stroke)
    }

    /// Export the grid to a fresh pixel vector
    pub fn extract(&mut self) -> Result<&PixelVector> {
        if !self.has_drawing {
            return Err(self.fail_validation(ValidationError::NothingDrawn));
        }

        self.error = None;
        self.prediction = None;
        self.predicted_at = None;
        // Same grid, same vector: an outstanding request stays valid
        if self.state != SessionState::Predicting {
            self.state = SessionState::Extracted;
        }

        let pixels = canvas::extract(&self.grid);
        debug!("Extracted {} values ({} inked)", pixels.len(), pixels.inked());
        Ok(&*self.pixels.insert(pixels))
    }

    /// Claim the single request slot and hand out the vector to send
    pub fn begin_prediction(&mut self) -> Result<Submission> {
        if self.in_flight {
            // The in-flight request owns the error slot; leave it alone
            return Err(ValidationError::PredictionPending.into());
        }
        let Some(pixels) = self.pixels.clone() else {
            return Err(self.fail_validation(ValidationError::NotExtracted));
        };

        self.error = None;
        self.prediction = None;
        self.predicted_at = None;
        self.in_flight = true;
        self.state = SessionState::Predicting;

        Ok(Submission {
            pixels,
            revision: self.revision,
        })
    }

    /// Publish the outcome of a request started with [`Session::begin_prediction`]
    ///
    /// Results for a grid that has since been painted on or cleared are dropped.
    pub fn finish_prediction(&mut self, revision: u64, result: Result<Prediction>) {
        self.in_flight = false;

        if revision != self.revision {
            debug!(
                "Discarding prediction for revision {} (grid now at {})",
                revision, self.revision
            );
            return;
        }

        match result {
            Ok(prediction) => {
                info!(
                    "Predicted digit {} ({}%)",
                    prediction.predicted_digit,
                    prediction.confidence_percent()
                );
                self.prediction = Some(prediction);
                self.predicted_at = Some(Local::now());
                self.state = SessionState::Predicted;
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                self.error = Some(e);
                self.state = SessionState::PredictionFailed;
            }
        }
    }

    /// Submit the current vector and wait for the answer
    ///
    /// The outcome lands in [`Session::prediction`] or [`Session::error`];
    /// the returned state says which.
    pub async fn submit(&mut self, predictor: &dyn Predictor) -> SessionState {
        match self.begin_prediction() {
            Ok(submission) => {
                let result = predictor.predict(&submission.pixels).await;
                self.finish_prediction(submission.revision, result);
            }
            Err(e) => warn!("Prediction not submitted: {}", e),
        }
        self.state
    }

    /// Back to a blank grid from any state
    pub fn clear(&mut self) {
        self.grid.clear();
        self.revision += 1;
        self.state = SessionState::Empty;
        self.pixels = None;
        self.prediction = None;
        self.predicted_at = None;
        self.error = None;
        self.has_drawing = false;
        self.gesture_active = false;
    }

    fn fail_validation(&mut self, error: ValidationError) -> CanvasError {
        self.error = Some(error.into());
        error.into()
    }
}
