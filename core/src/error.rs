use slide_common::ValidationError;
use slide_genai::{GenAiError, ParseError};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::images::ImageError;
use crate::pptx::RenderError;

/// Everything that can end a generation request.
#[derive(Error, Debug)]
pub enum SlideError {
    /// Request rejected before any external call
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The text-generation provider failed
    #[error("Text generation failed: {0}")]
    Upstream(#[from] GenAiError),

    /// The provider answered with something that is not a slide deck
    #[error("Could not parse generated slides: {0}")]
    Parse(#[from] ParseError),

    /// Writing the presentation package failed
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image setup failed: {0}")]
    Image(#[from] ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SlideError>;

impl SlideError {
    /// Whether the caller sent something wrong, as opposed to us failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SlideError::Validation(_))
    }

    /// Message safe to hand back over HTTP. Upstream detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            SlideError::Validation(e) => e.to_string(),
            SlideError::Upstream(_) | SlideError::Parse(_) => {
                "Failed to generate presentation content. Please try again.".to_string()
            }
            SlideError::Config(ConfigError::MissingApiKey { var }) => {
                format!("Server is not configured: {var} is not set")
            }
            _ => "Failed to create presentation".to_string(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SlideError::Validation(_) => ErrorSeverity::Warning,
            SlideError::Config(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARNING"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
