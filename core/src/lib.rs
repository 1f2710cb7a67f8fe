//! Core library: configuration, layout, PPTX rendering, image acquisition
//! and the generation pipeline that ties them together.

pub mod config;
pub mod error;
pub mod generator;
pub mod images;
pub mod layout;
pub mod pptx;

pub use config::{Config, ConfigError, Provider};
pub use error::{Result, SlideError};
pub use generator::{GenerationOutcome, Generator};
pub use pptx::{PresentationWriter, PPTX_MIME};
