//! Text-generation side of the slide pipeline: provider clients, the
//! generation prompt, and the parser that turns replies into slides.

pub mod client;
pub mod error;
pub mod parser;
pub mod prompt;

pub use client::{GeminiClient, OpenAiClient, TextGenerator};
pub use error::{GenAiError, ParseError};
pub use parser::parse_slides;
pub use prompt::build_prompt;
