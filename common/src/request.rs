use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::{self, DEFAULT_THEME};

pub const MIN_SLIDES: usize = 3;
pub const MAX_SLIDES: usize = 30;
pub const DEFAULT_SLIDES: usize = 8;
pub const DEFAULT_STYLE: &str = "professional";

/// Rejections raised before any external call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide a topic")]
    EmptyTopic,

    #[error("Number of slides must be between {min} and {max}")]
    SlideCount { requested: usize, min: usize, max: usize },

    #[error("Unknown theme: {theme}")]
    UnknownTheme { theme: String },
}

/// Where slide images come from, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    None,
    Stock,
    Generated,
}

impl ImageMode {
    pub fn from_flags(include_images: bool, use_ai_images: bool) -> Self {
        if use_ai_images {
            ImageMode::Generated
        } else if include_images {
            ImageMode::Stock
        } else {
            ImageMode::None
        }
    }

    pub fn enabled(&self) -> bool {
        !matches!(self, ImageMode::None)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ImageMode::None => "no images",
            ImageMode::Stock => "stock images",
            ImageMode::Generated => "AI images",
        }
    }
}

/// Everything a single generation needs besides the output location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub topic: String,
    pub num_slides: usize,
    pub style: String,
    pub audience: String,
    pub include_code: bool,
    pub images: ImageMode,
    pub include_diagrams: bool,
    pub theme: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            topic: String::new(),
            num_slides: DEFAULT_SLIDES,
            style: DEFAULT_STYLE.to_string(),
            audience: String::new(),
            include_code: false,
            images: ImageMode::None,
            include_diagrams: true,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl GenerationOptions {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Trim free-text fields and check every bound.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.topic = self.topic.trim().to_string();
        self.audience = self.audience.trim().to_string();
        if self.style.trim().is_empty() {
            self.style = DEFAULT_STYLE.to_string();
        }
        if self.topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        validate_slide_count(self.num_slides)?;
        if theme::theme(&self.theme).is_none() {
            return Err(ValidationError::UnknownTheme {
                theme: self.theme.clone(),
            });
        }
        Ok(self)
    }
}

pub fn validate_slide_count(requested: usize) -> Result<usize, ValidationError> {
    if (MIN_SLIDES..=MAX_SLIDES).contains(&requested) {
        Ok(requested)
    } else {
        Err(ValidationError::SlideCount {
            requested,
            min: MIN_SLIDES,
            max: MAX_SLIDES,
        })
    }
}
