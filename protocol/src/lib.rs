//! JSON bodies exchanged with the HTTP API.

use serde::{Deserialize, Deserializer, Serialize};
use slide_common::{
    themes, GenerationOptions, ImageMode, SlideSpec, ThemeSpec, DEFAULT_SLIDES, DEFAULT_STYLE,
    DEFAULT_THEME,
};

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, alias = "topic")]
    pub prompt: String,
    #[serde(
        default = "default_slides",
        alias = "slides",
        deserialize_with = "slide_count"
    )]
    pub num_slides: usize,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub include_images: bool,
    #[serde(default)]
    pub use_ai_images: bool,
    #[serde(default)]
    pub include_code: bool,
    #[serde(default = "default_true")]
    pub include_diagrams: bool,
    #[serde(default)]
    pub theme: Option<String>,
}

fn default_slides() -> usize {
    DEFAULT_SLIDES
}

fn default_true() -> bool {
    true
}

/// Accepts `8` or `"8"`. Negative counts become 0 so range validation
/// reports them the same way as any other out-of-range value.
fn slide_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let n = match Count::deserialize(deserializer)? {
        Count::Int(n) => n,
        Count::Float(f) if f.fract() == 0.0 => f as i64,
        Count::Float(f) => {
            return Err(serde::de::Error::custom(format!(
                "num_slides must be a whole number, got {f}"
            )))
        }
        Count::Text(s) => s.trim().parse::<i64>().map_err(|_| {
            serde::de::Error::custom(format!("num_slides must be a number, got {s:?}"))
        })?,
    };
    Ok(usize::try_from(n).unwrap_or(0))
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            num_slides: DEFAULT_SLIDES,
            style: None,
            audience: None,
            include_images: false,
            use_ai_images: false,
            include_code: false,
            include_diagrams: true,
            theme: None,
        }
    }
}

impl GenerateRequest {
    pub fn into_options(self) -> GenerationOptions {
        GenerationOptions {
            topic: self.prompt,
            num_slides: self.num_slides,
            style: self.style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            audience: self.audience.unwrap_or_default(),
            include_code: self.include_code,
            images: ImageMode::from_flags(self.include_images, self.use_ai_images),
            include_diagrams: self.include_diagrams,
            theme: self.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub filename: String,
    pub num_slides: usize,
    pub slides_data: Vec<SlideSpec>,
    pub theme: String,
    pub message: String,
}

impl GenerateResponse {
    pub fn new(filename: String, slides: Vec<SlideSpec>, theme: String, images: ImageMode) -> Self {
        Self {
            success: true,
            filename,
            num_slides: slides.len(),
            slides_data: slides,
            theme,
            message: format!(
                "Presentation generated successfully with diagrams and {}!",
                images.describe()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            filename: None,
        }
    }

    pub fn for_file(error: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            filename: Some(filename.into()),
        }
    }
}

/// One entry of the theme listing, colours in CSS `rgb()` notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub id: String,
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl ThemeInfo {
    pub fn new(id: &str, theme: &ThemeSpec) -> Self {
        Self {
            id: id.to_string(),
            name: theme.name.to_string(),
            primary: theme.primary.css(),
            secondary: theme.secondary.css(),
            accent: theme.accent.css(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemesResponse {
    pub themes: Vec<ThemeInfo>,
}

impl ThemesResponse {
    pub fn catalog() -> Self {
        Self {
            themes: themes().map(|(id, t)| ThemeInfo::new(id, t)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidesResponse {
    pub success: bool,
    pub filename: String,
    pub slides: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_body_takes_defaults() {
        let req = parse(json!({}));
        assert_eq!(req, GenerateRequest::default());

        let opts = req.into_options();
        assert_eq!(opts.num_slides, 8);
        assert_eq!(opts.style, "professional");
        assert_eq!(opts.theme, "modern_blue");
        assert!(opts.include_diagrams);
        assert_eq!(opts.images, ImageMode::None);
    }

    #[test]
    fn aliases_are_accepted() {
        let req = parse(json!({"topic": "Tides", "slides": 5}));
        assert_eq!(req.prompt, "Tides");
        assert_eq!(req.num_slides, 5);
    }

    #[test]
    fn slide_count_may_be_a_string() {
        assert_eq!(parse(json!({"num_slides": "12"})).num_slides, 12);
        assert_eq!(parse(json!({"num_slides": 10.0})).num_slides, 10);
        assert_eq!(parse(json!({"num_slides": -4})).num_slides, 0);
        assert!(serde_json::from_value::<GenerateRequest>(json!({"num_slides": "many"})).is_err());
        assert!(serde_json::from_value::<GenerateRequest>(json!({"num_slides": 4.5})).is_err());
    }

    #[test]
    fn ai_images_win_over_stock() {
        let opts = parse(json!({
            "prompt": "Space",
            "include_images": true,
            "use_ai_images": true,
            "include_diagrams": false,
            "theme": "tech_dark"
        }))
        .into_options();
        assert_eq!(opts.images, ImageMode::Generated);
        assert!(!opts.include_diagrams);
        assert_eq!(opts.theme, "tech_dark");
    }

    #[test]
    fn theme_catalog_uses_css_colours() {
        let catalog = ThemesResponse::catalog();
        assert_eq!(catalog.themes.len(), themes().count());
        let blue = catalog
            .themes
            .iter()
            .find(|t| t.id == "modern_blue")
            .unwrap();
        assert!(blue.primary.starts_with("rgb("));
    }

    #[test]
    fn error_body_omits_missing_filename() {
        let body = serde_json::to_value(ErrorResponse::new("nope")).unwrap();
        assert_eq!(body, json!({"error": "nope"}));
        let body = serde_json::to_value(ErrorResponse::for_file("missing", "a.pptx")).unwrap();
        assert_eq!(body["filename"], "a.pptx");
    }

    #[test]
    fn success_message_names_image_source() {
        let resp = GenerateResponse::new(
            "x.pptx".to_string(),
            vec![SlideSpec::new("One")],
            "modern_blue".to_string(),
            ImageMode::Stock,
        );
        assert!(resp.success);
        assert_eq!(resp.num_slides, 1);
        assert!(resp.message.ends_with("with diagrams and stock images!"));
    }
}
