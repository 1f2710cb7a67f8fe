//! HTTP front end over [`Generator`].
//!
//! Requests are served one at a time on a blocking thread; each one drives
//! the async pipeline to completion on the caller's runtime before the next
//! is accepted.

use std::io::Read;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use slide_common::{is_plain_filename, slide_cache_filename};
use slide_core::{Generator, SlideError, PPTX_MIME};
use slide_protocol::{
    ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse, SlidesResponse,
    ThemesResponse,
};
use tiny_http::{Header, Method, Response, Server};
use tracing::{error, info, warn};

/// Largest request body accepted.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const JSON: &str = "application/json";

pub struct AppState {
    generator: Generator,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }
}

/// A fully buffered response, independent of the transport.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::raw(status, JSON, body),
            Err(e) => {
                error!("Could not serialise response: {e}");
                Self::raw(500, JSON, br#"{"error":"Internal server error"}"#.to_vec())
            }
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ErrorResponse::new(message))
    }

    fn raw(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type".to_string(), content_type.to_string()),
                ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ],
            body,
        }
    }

    fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Route one request.
pub async fn handle(state: &AppState, method: &Method, url: &str, body: &[u8]) -> ApiResponse {
    let path = url.split(['?', '#']).next().unwrap_or_default();

    if *method == Method::Options {
        return ApiResponse::raw(204, "text/plain", Vec::new())
            .with_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .with_header("Access-Control-Allow-Headers", "Content-Type");
    }

    match (method, path) {
        (Method::Get, "/health") => ApiResponse::json(200, &HealthResponse::healthy()),
        (Method::Get, "/api/themes") => ApiResponse::json(200, &ThemesResponse::catalog()),
        (Method::Post, "/generate" | "/api/generate") => generate(state, body).await,
        (Method::Get, _) if path.starts_with("/api/slides/") => {
            with_filename(&path["/api/slides/".len()..], |name| slides(state, name)).await
        }
        (Method::Get, _) if path.starts_with("/download/") => {
            with_filename(&path["/download/".len()..], |name| download(state, name)).await
        }
        (_, "/health" | "/api/themes" | "/generate" | "/api/generate") => {
            ApiResponse::error(405, "Method not allowed")
        }
        _ => ApiResponse::error(404, "Not found"),
    }
}

async fn with_filename<F, Fut>(segment: &str, serve: F) -> ApiResponse
where
    F: FnOnce(String) -> Fut,
    Fut: std::future::Future<Output = ApiResponse>,
{
    match urlencoding::decode(segment) {
        Ok(name) if is_plain_filename(&name) => serve(name.into_owned()).await,
        _ => {
            warn!("Rejected filename {segment:?}");
            ApiResponse::error(400, "Invalid filename")
        }
    }
}

async fn generate(state: &AppState, body: &[u8]) -> ApiResponse {
    if body.len() > MAX_BODY_BYTES {
        return ApiResponse::error(413, "Request body too large");
    }
    let request: GenerateRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return ApiResponse::error(400, format!("Invalid request body: {e}")),
    };
    let options = request.into_options();
    let images = options.images;

    match state.generator.generate(options).await {
        Ok(outcome) => ApiResponse::json(
            200,
            &GenerateResponse::new(outcome.filename, outcome.slides, outcome.theme, images),
        ),
        Err(e) => {
            log_failure(&e);
            let status = if e.is_client_error() { 400 } else { 500 };
            ApiResponse::error(status, e.user_message())
        }
    }
}

fn log_failure(e: &SlideError) {
    if e.is_client_error() {
        warn!("[{}] Rejected generation request: {e}", e.severity());
    } else {
        error!("[{}] Generation failed: {e}", e.severity());
    }
}

async fn slides(state: &AppState, filename: String) -> ApiResponse {
    let path = state
        .generator
        .cache_dir()
        .join(slide_cache_filename(&filename));
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ApiResponse::json(
                404,
                &ErrorResponse::for_file(
                    "Slide data not found. This presentation may have been generated in an older session.",
                    filename,
                ),
            );
        }
        Err(e) => {
            error!("Could not read {}: {e}", path.display());
            return ApiResponse::error(500, "Could not read slide data");
        }
    };
    match serde_json::from_slice(&data) {
        Ok(slides) => ApiResponse::json(
            200,
            &SlidesResponse {
                success: true,
                filename,
                slides,
            },
        ),
        Err(e) => {
            error!("Corrupt slide cache {}: {e}", path.display());
            ApiResponse::error(500, "Could not read slide data")
        }
    }
}

async fn download(state: &AppState, filename: String) -> ApiResponse {
    let path = state.generator.output_dir().join(&filename);
    match tokio::fs::read(&path).await {
        Ok(data) => ApiResponse::raw(200, PPTX_MIME, data).with_header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ApiResponse::error(404, "File not found")
        }
        Err(e) => {
            error!("Could not read {}: {e}", path.display());
            ApiResponse::error(500, "Could not read file")
        }
    }
}

/// Bind `address` and serve until the listener fails.
pub async fn serve(state: AppState, address: &str) -> Result<()> {
    let server = Server::http(address).map_err(|e| anyhow!("Failed to bind {address}: {e}"))?;
    info!("Listening on http://{address}");
    info!("Output directory: {}", state.generator.output_dir().display());
    info!("Cache directory: {}", state.generator.cache_dir().display());

    let runtime = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();

            let response = match read_body(&mut request) {
                Ok(body) => runtime.block_on(handle(&state, &method, &url, &body)),
                Err(response) => response,
            };
            info!("{method} {url} -> {}", response.status);

            if let Err(e) = request.respond(into_http(response)) {
                warn!("Failed to send response for {url}: {e}");
            }
        }
    })
    .await
    .context("HTTP server thread panicked")?;
    Ok(())
}

fn read_body(request: &mut tiny_http::Request) -> std::result::Result<Vec<u8>, ApiResponse> {
    if request.body_length().is_some_and(|len| len > MAX_BODY_BYTES) {
        return Err(ApiResponse::error(413, "Request body too large"));
    }
    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| ApiResponse::error(400, format!("Could not read request body: {e}")))?;
    if body.len() > MAX_BODY_BYTES {
        return Err(ApiResponse::error(413, "Request body too large"));
    }
    Ok(body)
}

fn into_http(response: ApiResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut http = Response::from_data(response.body).with_status_code(response.status);
    for (name, value) in response.headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => http.add_header(header),
            Err(()) => warn!("Dropping invalid header {name}"),
        }
    }
    http
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use slide_core::images::{ImageCache, ImageError, ImageFetcher, ImageSource};
    use slide_genai::{GenAiError, TextGenerator};
    use std::sync::Arc;
    use tempfile::TempDir;

    const DECK: &str = r#"{"slides": [
        {"title": "One", "bullets": ["a"]},
        {"title": "Two", "bullets": ["b"], "notes": "say b"},
        {"title": "Three", "bullets": ["c"]}
    ]}"#;

    struct FakeText(std::result::Result<&'static str, u16>);

    #[async_trait]
    impl TextGenerator for FakeText {
        fn provider(&self) -> &'static str {
            "fake"
        }

        async fn generate(&self, _prompt: &str) -> std::result::Result<String, GenAiError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(GenAiError::Status {
                    provider: "fake",
                    status,
                    body: "internal upstream detail".to_string(),
                }),
            }
        }
    }

    struct Offline;

    #[async_trait]
    impl ImageFetcher for Offline {
        fn source(&self) -> ImageSource {
            ImageSource::Stock
        }

        async fn fetch(&self, _q: &str, _w: u32, _h: u32) -> std::result::Result<Vec<u8>, ImageError> {
            Err(ImageError::Status(503))
        }
    }

    fn state(reply: std::result::Result<&'static str, u16>) -> (TempDir, AppState) {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let generator = Generator::new(
            Arc::new(FakeText(reply)),
            ImageCache::new(&cache, Arc::new(Offline)),
            ImageCache::new(&cache, Arc::new(Offline)),
            tmp.path().join("output"),
            &cache,
        );
        (tmp, AppState::new(generator))
    }

    fn body_json(response: &ApiResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[tokio::test]
    async fn health_and_themes() {
        let (_tmp, state) = state(Ok(DECK));

        let health = handle(&state, &Method::Get, "/health", b"").await;
        assert_eq!(health.status, 200);
        assert_eq!(body_json(&health), json!({"status": "healthy"}));
        assert_eq!(health.header("access-control-allow-origin"), Some("*"));

        let themes = handle(&state, &Method::Get, "/api/themes", b"").await;
        let body = body_json(&themes);
        let list = body["themes"].as_array().unwrap();
        assert!(!list.is_empty());
        assert!(list.iter().any(|t| t["id"] == "modern_blue"));
        assert!(list[0]["primary"].as_str().unwrap().starts_with("rgb("));
    }

    #[tokio::test]
    async fn generate_then_fetch_slides_and_download() {
        let (_tmp, state) = state(Ok(DECK));

        let body = json!({"prompt": "Ocean tides", "num_slides": "3"}).to_string();
        let resp = handle(&state, &Method::Post, "/generate", body.as_bytes()).await;
        assert_eq!(resp.status, 200);
        let generated = body_json(&resp);
        assert_eq!(generated["success"], true);
        assert_eq!(generated["num_slides"], 3);
        assert_eq!(generated["theme"], "modern_blue");
        assert_eq!(generated["slides_data"][1]["notes"], "say b");
        let filename = generated["filename"].as_str().unwrap().to_string();
        assert!(filename.starts_with("Ocean_tides_"));

        let slides = handle(&state, &Method::Get, &format!("/api/slides/{filename}"), b"").await;
        assert_eq!(slides.status, 200);
        let slides = body_json(&slides);
        assert_eq!(slides["filename"], filename.as_str());
        assert_eq!(slides["slides"].as_array().unwrap().len(), 3);

        let file = handle(&state, &Method::Get, &format!("/download/{filename}"), b"").await;
        assert_eq!(file.status, 200);
        assert_eq!(file.header("Content-Type"), Some(PPTX_MIME));
        assert!(file
            .header("Content-Disposition")
            .unwrap()
            .contains(&filename));
        assert_eq!(&file.body[..2], b"PK");
    }

    #[tokio::test]
    async fn validation_failures_are_400() {
        let (_tmp, state) = state(Ok(DECK));

        let resp = handle(&state, &Method::Post, "/generate", br#"{"prompt": "x", "num_slides": 31}"#).await;
        assert_eq!(resp.status, 400);
        assert_eq!(
            body_json(&resp)["error"],
            "Number of slides must be between 3 and 30"
        );

        let resp = handle(&state, &Method::Post, "/api/generate", br#"{"topic": "   "}"#).await;
        assert_eq!(resp.status, 400);
        assert_eq!(body_json(&resp)["error"], "Please provide a topic");

        let resp = handle(&state, &Method::Post, "/generate", br#"{"prompt": "x", "theme": "neon"}"#).await;
        assert_eq!(resp.status, 400);

        let resp = handle(&state, &Method::Post, "/generate", b"not json").await;
        assert_eq!(resp.status, 400);
    }

    #[tokio::test]
    async fn upstream_failure_is_a_generic_500() {
        let (_tmp, state) = state(Err(500));
        let resp = handle(&state, &Method::Post, "/generate", br#"{"prompt": "Volcanoes"}"#).await;
        assert_eq!(resp.status, 500);
        let error = body_json(&resp)["error"].as_str().unwrap().to_string();
        assert!(!error.contains("upstream detail"));
    }

    #[tokio::test]
    async fn missing_files_are_404() {
        let (_tmp, state) = state(Ok(DECK));

        let resp = handle(&state, &Method::Get, "/api/slides/nothing.pptx", b"").await;
        assert_eq!(resp.status, 404);
        assert_eq!(body_json(&resp)["filename"], "nothing.pptx");

        let resp = handle(&state, &Method::Get, "/download/nothing.pptx", b"").await;
        assert_eq!(resp.status, 404);
        assert_eq!(body_json(&resp)["error"], "File not found");

        let resp = handle(&state, &Method::Get, "/nowhere", b"").await;
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_tmp, state) = state(Ok(DECK));
        for url in [
            "/download/..%2Fsecret.pptx",
            "/download/a%2Fb.pptx",
            "/api/slides/..",
            "/download/%5Cwindows.pptx",
        ] {
            let resp = handle(&state, &Method::Get, url, b"").await;
            assert_eq!(resp.status, 400, "{url}");
        }
    }

    #[tokio::test]
    async fn preflight_and_wrong_methods() {
        let (_tmp, state) = state(Ok(DECK));

        let resp = handle(&state, &Method::Options, "/generate", b"").await;
        assert_eq!(resp.status, 204);
        assert!(resp
            .header("Access-Control-Allow-Methods")
            .unwrap()
            .contains("POST"));

        let resp = handle(&state, &Method::Get, "/generate", b"").await;
        assert_eq!(resp.status, 405);
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let (_tmp, state) = state(Ok(DECK));
        let body = vec![b' '; MAX_BODY_BYTES + 1];
        let resp = handle(&state, &Method::Post, "/generate", &body).await;
        assert_eq!(resp.status, 413);
    }
}
