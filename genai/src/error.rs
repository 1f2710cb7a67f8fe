use thiserror::Error;

/// How much of a raw model response is carried in parse errors.
pub const PREVIEW_CHARS: usize = 500;

/// Failures talking to the text-generation provider.
#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected {provider} response: {reason}")]
    Envelope {
        provider: &'static str,
        reason: String,
    },
}

/// Request URLs are dropped so credentials never reach logs or callers.
impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        GenAiError::Http(err.without_url())
    }
}

/// Failures turning model text into slides.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Response is not valid JSON ({source}); response starts with: {preview}")]
    Json {
        #[source]
        source: serde_json::Error,
        preview: String,
    },

    #[error("Response does not match the slide schema ({reason}); response starts with: {preview}")]
    Schema { reason: String, preview: String },
}

impl ParseError {
    pub fn preview(&self) -> &str {
        match self {
            ParseError::Json { preview, .. } | ParseError::Schema { preview, .. } => preview,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `raw`, cut on a char boundary.
pub fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_CHARS).collect()
}
