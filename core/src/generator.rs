//! End-to-end generation: prompt, model call, parse, images, layout, package.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use slide_common::{
    generate_presentation_filename, save_file, slide_cache_filename, theme, GenerationOptions, ImageMode,
    SlideSpec, ThemeSpec, ValidationError,
};
use slide_genai::{build_prompt, parse_slides, TextGenerator};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Result;
use crate::images::{HttpImageFetcher, ImageCache, ImageSource, IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::layout::compose_slide;
use crate::pptx::PresentationWriter;

/// Characters of the raw model response shown at debug level.
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// What one successful generation produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub filename: String,
    pub output_path: PathBuf,
    pub cache_path: PathBuf,
    pub slides: Vec<SlideSpec>,
    pub theme: String,
    pub num_slides: usize,
}

pub struct Generator {
    text: Arc<dyn TextGenerator>,
    stock: ImageCache,
    generated: ImageCache,
    output_dir: PathBuf,
    cache_dir: PathBuf,
}

impl Generator {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        stock: ImageCache,
        generated: ImageCache,
        output_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            text,
            stock,
            generated,
            output_dir: output_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Wire up the configured provider and both image sources.
    pub fn from_config(config: &Config) -> Result<Self> {
        let text = config.build_text_generator()?;
        let timeout = config.image_timeout();
        let stock = HttpImageFetcher::new(ImageSource::Stock, &config.stock_image_url, timeout)?;
        let generated =
            HttpImageFetcher::new(ImageSource::Generated, &config.ai_image_url, timeout)?;
        Ok(Self::new(
            text,
            ImageCache::new(&config.cache_dir, Arc::new(stock)),
            ImageCache::new(&config.cache_dir, Arc::new(generated)),
            &config.output_dir,
            &config.cache_dir,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Generate into the output directory under a topic-derived filename.
    pub async fn generate(&self, options: GenerationOptions) -> Result<GenerationOutcome> {
        let options = options.validated()?;
        let filename = generate_presentation_filename(&options.topic);
        let output_path = self.output_dir.join(&filename);
        self.generate_to(options, &output_path).await
    }

    /// Generate and write the presentation to `output_path`.
    pub async fn generate_to(
        &self,
        options: GenerationOptions,
        output_path: &Path,
    ) -> Result<GenerationOutcome> {
        let options = options.validated()?;
        let palette = resolve_theme(&options.theme)?;
        info!(
            "Generating {} slides about '{}' ({} style, {} theme, images: {})",
            options.num_slides,
            options.topic,
            options.style,
            options.theme,
            options.images.describe()
        );

        let prompt = build_prompt(&options);
        let raw = self.text.generate(&prompt).await.map_err(|e| {
            error!("{} request failed: {e}", self.text.provider());
            e
        })?;
        debug!(
            "Model response: {}",
            raw.chars().take(RESPONSE_PREVIEW_CHARS).collect::<String>()
        );

        let mut slides = parse_slides(&raw).map_err(|e| {
            error!("Could not parse model response: {e}");
            e
        })?;
        strip_disabled(&mut slides, &options);
        info!("Parsed {} slides", slides.len());

        let filename = output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| generate_presentation_filename(&options.topic));
        let cache_path = self.write_slide_cache(&filename, &slides).await?;

        let images = self.acquire_images(&slides, options.images).await;

        let mut writer = PresentationWriter::new(palette).with_title(options.topic.as_str());
        for (slide, image) in slides.iter().zip(&images) {
            let canvas = compose_slide(slide, palette, image.as_deref());
            writer.add_slide(canvas, &slide.notes);
        }
        let bytes = writer.to_bytes()?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, &bytes).await?;
        info!(
            "Wrote {} ({} slides, {} bytes)",
            output_path.display(),
            slides.len(),
            bytes.len()
        );

        Ok(GenerationOutcome {
            filename,
            output_path: output_path.to_path_buf(),
            cache_path,
            num_slides: slides.len(),
            slides,
            theme: options.theme,
        })
    }

    /// Slide data saved next to the other cache entries, pretty-printed.
    async fn write_slide_cache(&self, filename: &str, slides: &[SlideSpec]) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(slides)?;
        let path = save_file(&self.cache_dir, &slide_cache_filename(filename), &json).await?;
        debug!("Cached slide data at {}", path.display());
        Ok(path)
    }

    /// One entry per slide, fetched one after another.
    async fn acquire_images(&self, slides: &[SlideSpec], mode: ImageMode) -> Vec<Option<Vec<u8>>> {
        let cache = match mode {
            ImageMode::None => return vec![None; slides.len()],
            ImageMode::Stock => &self.stock,
            ImageMode::Generated => &self.generated,
        };
        let mut images = Vec::with_capacity(slides.len());
        for slide in slides {
            let image = match &slide.image_query {
                Some(query) => {
                    let acquired = cache.acquire(query, IMAGE_WIDTH, IMAGE_HEIGHT).await;
                    debug!("Image for '{}' came from {:?}", slide.title, acquired.origin);
                    Some(acquired.data)
                }
                None => None,
            };
            images.push(image);
        }
        images
    }
}

fn resolve_theme(key: &str) -> std::result::Result<&'static ThemeSpec, ValidationError> {
    theme(key).ok_or_else(|| ValidationError::UnknownTheme {
        theme: key.to_string(),
    })
}

/// Drop optional content the request did not ask for.
fn strip_disabled(slides: &mut [SlideSpec], options: &GenerationOptions) {
    for slide in slides {
        if !options.include_code {
            slide.code = None;
        }
        if !options.include_diagrams {
            slide.diagram = None;
        }
        if !options.images.enabled() {
            slide.image_query = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlideError;
    use crate::images::{images_dir, ImageError, ImageFetcher};
    use async_trait::async_trait;
    use slide_genai::GenAiError;
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;
    use zip::ZipArchive;

    const DECK: &str = r#"```json
{"slides": [
  {"title": "Welcome", "bullets": ["Hello", "Agenda"], "notes": "Greet everyone",
   "image_search": "sunrise"},
  {"title": "Process", "bullets": ["Three steps"],
   "diagram": {"type": "flowchart", "items": ["Plan", "Build", "Ship"]},
   "code": "print('hi')"},
  {"title": "Wrap up", "bullets": ["Thanks"]}
]}
```"#;

    struct FakeText {
        reply: std::result::Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeText {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeText {
        fn provider(&self) -> &'static str {
            "fake"
        }

        async fn generate(&self, prompt: &str) -> std::result::Result<String, GenAiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(GenAiError::Status {
                    provider: "fake",
                    status: *status,
                    body: "quota exceeded".to_string(),
                }),
            }
        }
    }

    struct NoImages {
        source: ImageSource,
        calls: AtomicUsize,
    }

    impl NoImages {
        fn new(source: ImageSource) -> Arc<Self> {
            Arc::new(Self {
                source,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ImageFetcher for NoImages {
        fn source(&self) -> ImageSource {
            self.source
        }

        async fn fetch(&self, _q: &str, _w: u32, _h: u32) -> std::result::Result<Vec<u8>, ImageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ImageError::Status(404))
        }
    }

    struct Fixture {
        _tmp: TempDir,
        generator: Generator,
        text: Arc<FakeText>,
        stock: Arc<NoImages>,
        generated: Arc<NoImages>,
    }

    fn fixture(text: Arc<FakeText>) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let stock = NoImages::new(ImageSource::Stock);
        let generated = NoImages::new(ImageSource::Generated);
        let generator = Generator::new(
            text.clone(),
            ImageCache::new(&cache_dir, stock.clone()),
            ImageCache::new(&cache_dir, generated.clone()),
            tmp.path().join("output"),
            &cache_dir,
        );
        Fixture {
            _tmp: tmp,
            generator,
            text,
            stock,
            generated,
        }
    }

    fn options(topic: &str) -> GenerationOptions {
        GenerationOptions {
            num_slides: 3,
            ..GenerationOptions::new(topic)
        }
    }

    fn slide_part_count(path: &Path) -> usize {
        let mut archive = ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let mut presentation = String::new();
        archive
            .by_name("ppt/presentation.xml")
            .unwrap()
            .read_to_string(&mut presentation)
            .unwrap();
        assert!(presentation.contains("<p:sldIdLst>"));
        names
            .iter()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count()
    }

    #[tokio::test]
    async fn generates_deck_and_slide_cache() {
        let fx = fixture(FakeText::replying(DECK));
        let mut opts = options("Rust in production");
        opts.include_code = true;

        let outcome = fx.generator.generate(opts).await.unwrap();

        assert!(outcome.filename.starts_with("Rust_in_production_"));
        assert!(outcome.filename.ends_with(".pptx"));
        assert_eq!(outcome.output_path.parent().unwrap(), fx.generator.output_dir());
        assert_eq!(outcome.num_slides, 3);
        assert_eq!(outcome.theme, "modern_blue");
        assert_eq!(slide_part_count(&outcome.output_path), 3);

        let cached: Vec<SlideSpec> =
            serde_json::from_slice(&std::fs::read(&outcome.cache_path).unwrap()).unwrap();
        assert_eq!(cached, outcome.slides);
        assert_eq!(
            outcome.cache_path.file_name().unwrap().to_string_lossy(),
            outcome.filename.replace(".pptx", ".json")
        );
        assert_eq!(cached[1].code.as_deref(), Some("print('hi')"));

        let prompts = fx.text.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Rust in production"));
    }

    #[tokio::test]
    async fn disabled_features_are_stripped() {
        let fx = fixture(FakeText::replying(DECK));
        let mut opts = options("Pipelines");
        opts.include_diagrams = false;

        let outcome = fx.generator.generate(opts).await.unwrap();
        assert!(outcome.slides.iter().all(|s| s.diagram.is_none()));
        assert!(outcome.slides.iter().all(|s| s.code.is_none()));
        assert!(outcome.slides.iter().all(|s| s.image_query.is_none()));
        assert_eq!(fx.stock.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn images_use_the_requested_source() {
        let fx = fixture(FakeText::replying(DECK));
        let mut opts = options("Mornings");
        opts.images = ImageMode::Generated;

        let outcome = fx.generator.generate(opts).await.unwrap();
        assert_eq!(fx.generated.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.stock.calls.load(Ordering::SeqCst), 0);
        let cache_root = fx.generator.cache_dir();
        assert!(images_dir(cache_root, ImageSource::Generated)
            .read_dir()
            .unwrap()
            .next()
            .is_some());
        assert!(!images_dir(cache_root, ImageSource::Stock).exists());

        let mut archive =
            ZipArchive::new(std::fs::File::open(&outcome.output_path).unwrap()).unwrap();
        assert!(archive.by_name("ppt/media/image1.jpeg").is_ok());
    }

    #[tokio::test]
    async fn explicit_output_path_is_honoured() {
        let fx = fixture(FakeText::replying(DECK));
        let target = fx.generator.output_dir().join("nested").join("deck.pptx");

        let outcome = fx
            .generator
            .generate_to(options("Custom path"), &target)
            .await
            .unwrap();
        assert_eq!(outcome.filename, "deck.pptx");
        assert!(target.exists());
        assert!(fx.generator.cache_dir().join("deck.json").exists());
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_model() {
        let fx = fixture(FakeText::replying(DECK));
        let mut opts = options("Too short");
        opts.num_slides = 2;

        let err = fx.generator.generate(opts).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(fx.text.prompts.lock().unwrap().is_empty());

        let mut opts = options("Bad theme");
        opts.theme = "neon".to_string();
        let err = fx.generator.generate(opts).await.unwrap_err();
        assert!(matches!(
            err,
            SlideError::Validation(ValidationError::UnknownTheme { .. })
        ));
    }

    #[tokio::test]
    async fn upstream_failure_writes_nothing() {
        let fx = fixture(FakeText::failing(429));
        let err = fx.generator.generate(options("Anything")).await.unwrap_err();
        assert!(matches!(err, SlideError::Upstream(_)));
        assert!(!fx.generator.output_dir().exists());
    }

    #[tokio::test]
    async fn unparseable_reply_is_a_parse_error() {
        let fx = fixture(FakeText::replying("Sorry, I cannot help with that."));
        let err = fx.generator.generate(options("Anything")).await.unwrap_err();
        assert!(matches!(err, SlideError::Parse(_)));
        assert!(!err.is_client_error());
    }
}
