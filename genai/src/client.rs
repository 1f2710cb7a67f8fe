use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::GenAiError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// A provider that turns one prompt into one block of text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError>;
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    pub model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_model(api_key, DEFAULT_GEMINI_MODEL.to_string())
    }

    pub fn new_with_model(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        tracing::debug!(model = %self.model, "Sending generateContent request");

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let envelope = read_envelope(self.provider(), resp).await?;
        extract_gemini_text(&envelope)
    }
}

/// OpenAI chat-completions client (non-streaming).
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    pub model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_model(api_key, DEFAULT_OPENAI_MODEL.to_string())
    }

    pub fn new_with_model(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        tracing::debug!(model = %self.model, "Sending chat completion request");

        let mut req = self
            .http
            .post(format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key);
        if let Ok(project) = std::env::var("OPENAI_PROJECT") {
            if !project.is_empty() {
                req = req.header("OpenAI-Project", project);
            }
        }
        if let Ok(org) = std::env::var("OPENAI_ORG") {
            if !org.is_empty() {
                req = req.header("OpenAI-Organization", org);
            }
        }

        let resp = req.json(&body).send().await?;
        let envelope = read_envelope(self.provider(), resp).await?;
        extract_openai_text(&envelope)
    }
}

async fn read_envelope(provider: &'static str, resp: reqwest::Response) -> Result<Value, GenAiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!("{provider} http {status}: {body}");
        return Err(GenAiError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| GenAiError::Envelope {
        provider,
        reason: format!("body is not JSON: {e}"),
    })
}

pub(crate) fn extract_gemini_text(envelope: &Value) -> Result<String, GenAiError> {
    envelope["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| GenAiError::Envelope {
            provider: "gemini",
            reason: match envelope["promptFeedback"]["blockReason"].as_str() {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "no candidate text".to_string(),
            },
        })
}

pub(crate) fn extract_openai_text(envelope: &Value) -> Result<String, GenAiError> {
    envelope["choices"][0]["message"]["content"]
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| GenAiError::Envelope {
            provider: "openai",
            reason: "no message content".to_string(),
        })
}
