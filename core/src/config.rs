use serde::{Deserialize, Serialize};
use slide_genai::client::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
use slide_genai::{GeminiClient, OpenAiClient, TextGenerator};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_STOCK_IMAGE_URL: &str = "https://source.unsplash.com";
pub const DEFAULT_AI_IMAGE_URL: &str = "https://image.pollinations.ai/prompt";

const CONFIG_PATHS: [&str; 4] = [
    ".slide/config.toml",
    ".slide/config.json",
    "slide.config.toml",
    "slide.config.json",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },
    #[error("Failed to read config file: {source}")]
    IoError { source: std::io::Error },
    #[error("Failed to parse config file: {source}")]
    ParseError { source: serde_json::Error },
    #[error("Failed to parse TOML config: {source}")]
    TomlParseError { source: toml::de::Error },
    #[error("Unknown provider: {value} (expected gemini or openai)")]
    UnknownProvider { value: String },
    #[error("Environment variable not set: {var}")]
    MissingApiKey { var: &'static str },
}

/// Text-generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => DEFAULT_GEMINI_MODEL,
            Provider::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            _ => Err(ConfigError::UnknownProvider {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    /// Explicit key; when absent the provider's environment variable is read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model override; when absent the provider default is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub image_timeout_secs: u64,
    pub stock_image_url: String,
    pub ai_image_url: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            model: None,
            output_dir: PathBuf::from("output"),
            cache_dir: PathBuf::from("cache"),
            image_timeout_secs: 10,
            stock_image_url: DEFAULT_STOCK_IMAGE_URL.to_string(),
            ai_image_url: DEFAULT_AI_IMAGE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError { source: e })?;

        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::TomlParseError { source: e })
        } else {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError { source: e })
        }
    }

    /// First readable config file from the usual locations, else defaults.
    pub fn load_with_fallback() -> Self {
        for path in &CONFIG_PATHS {
            if Path::new(path).exists() {
                match Self::load_from_file(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {path}");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {path}: {e}");
                    }
                }
            }
        }

        tracing::debug!("Using default configuration");
        Self::default()
    }

    /// Full layering: explicit file (or the fallback search), then env.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_with_fallback(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("SLIDE_PROVIDER") {
            match provider.parse() {
                Ok(provider) => self.provider = provider,
                Err(e) => tracing::warn!("Ignoring SLIDE_PROVIDER: {e}"),
            }
        }
        if let Ok(model) = std::env::var("SLIDE_MODEL") {
            if !model.is_empty() {
                self.model = Some(model);
            }
        }
        if let Ok(dir) = std::env::var("SLIDE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SLIDE_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
    }

    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.provider.api_key_var()).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Text-generation client for the configured provider.
    pub fn build_text_generator(&self) -> Result<Arc<dyn TextGenerator>, ConfigError> {
        let api_key = self
            .resolved_api_key()
            .ok_or(ConfigError::MissingApiKey {
                var: self.provider.api_key_var(),
            })?;
        let model = self.model_name();
        tracing::debug!(provider = %self.provider, model = %model, "Building text generator");

        Ok(match self.provider {
            Provider::Gemini => Arc::new(GeminiClient::new_with_model(api_key, model)),
            Provider::OpenAi => Arc::new(OpenAiClient::new_with_model(api_key, model)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_service_layout() {
        let config = Config::default();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.image_timeout(), Duration::from_secs(10));
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.model_name(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "provider = \"openai\"\nmodel = \"gpt-4o\"\nport = 8080\noutput_dir = \"decks\""
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model_name(), "gpt-4o");
        assert_eq!(config.port, 8080);
        assert_eq!(config.output_dir, PathBuf::from("decks"));
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
    }

    #[test]
    fn json_file_is_accepted() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"host": "127.0.0.1", "image_timeout_secs": 3}}"#).unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.image_timeout_secs, 3);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Config::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn provider_parsing() {
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("claude".parse::<Provider>().is_err());
    }

    #[test]
    fn explicit_key_builds_a_generator() {
        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        let generator = config.build_text_generator().unwrap();
        assert_eq!(generator.provider(), "gemini");
    }
}
