use thiserror::Error;

/// Reasons a user action was refused before anything ran
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Extraction requested on a grid nobody has painted
    #[error("Please draw a digit first")]
    NothingDrawn,

    /// Prediction requested without an extracted pixel vector
    #[error("Please extract pixel values first")]
    NotExtracted,

    /// Prediction requested while another one is still in flight
    #[error("A prediction is already in progress")]
    PredictionPending,

    /// Batch prediction requested with no images
    #[error("Batch cannot be empty. Please provide at least one image")]
    EmptyBatch,

    /// Batch prediction requested with more images than the server accepts
    #[error("Batch size too large: {size} images, maximum {max} per batch")]
    BatchTooLarge { size: usize, max: usize },
}

/// Errors that can occur in the MNIST canvas
#[derive(Error, Debug)]
pub enum CanvasError {
    /// The triggering action was not allowed in the current session state
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The prediction service answered with a non-2xx status
    #[error("Server error: server responded with status {status}")]
    Server { status: u16 },

    /// The request never completed (timeout, DNS, refused, reset)
    #[error("Network error: could not reach the prediction server: {0}")]
    Network(String),

    /// The service answered 2xx but the body was not a prediction
    #[error("Invalid response from prediction server: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pixel data loaded from outside the grid did not have MNIST shape
    #[error("Invalid pixel vector: {0}")]
    InvalidPixels(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CanvasError {
    /// Status code carried by a server error
    pub fn status(&self) -> Option<u16> {
        match self {
            CanvasError::Server { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CanvasError::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, CanvasError::Network(_))
    }
}

/// Type alias for Result with CanvasError
pub type Result<T> = std::result::Result<T, CanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_carries_status() {
        let err = CanvasError::Server { status: 500 };
        assert!(err.to_string().contains("500"));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_network_and_server_messages_differ() {
        let network = CanvasError::Network("connection refused".to_string()).to_string();
        let server = CanvasError::Server { status: 502 }.to_string();
        assert!(network.starts_with("Network error"));
        assert!(server.starts_with("Server error"));
        assert_ne!(network, server);
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            CanvasError::from(ValidationError::NotExtracted).to_string(),
            "Please extract pixel values first"
        );
        assert!(CanvasError::from(ValidationError::NothingDrawn).is_validation());
    }

    #[test]
    fn test_validation_error_converts_with_question_mark() {
        fn refuse() -> Result<()> {
            let guard: std::result::Result<(), ValidationError> =
                Err(ValidationError::PredictionPending);
            guard?;
            Ok(())
        }

        let err = refuse().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "A prediction is already in progress");
    }

    #[test]
    fn test_batch_size_message_names_limit() {
        let err = CanvasError::from(ValidationError::BatchTooLarge { size: 11, max: 10 });
        assert!(err.to_string().contains("maximum 10"));
        assert!(err.is_validation());
    }
}
