use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub const PRESENTATION_EXTENSION: &str = "pptx";
const MAX_TOPIC_CHARS: usize = 50;

/// Generate the output filename for a presentation about `topic`.
pub fn generate_presentation_filename(topic: &str) -> String {
    presentation_filename_at(topic, Local::now())
}

pub fn presentation_filename_at(topic: &str, at: DateTime<Local>) -> String {
    let mut stem = sanitize_topic(topic);
    if stem.is_empty() {
        stem = "presentation".to_string();
    }
    format!(
        "{}_{}.{}",
        stem,
        at.format("%Y%m%d_%H%M%S"),
        PRESENTATION_EXTENSION
    )
}

/// Keep alphanumerics, spaces, `-` and `_`; spaces become underscores.
pub fn sanitize_topic(topic: &str) -> String {
    topic
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
        .chars()
        .take(MAX_TOPIC_CHARS)
        .collect()
}

/// Name of the slide-data cache entry that mirrors a presentation filename.
pub fn slide_cache_filename(presentation: &str) -> String {
    match presentation.strip_suffix(".pptx") {
        Some(stem) => format!("{stem}.json"),
        None => format!("{presentation}.json"),
    }
}

/// A bare filename with no directory components.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Ensure a directory exists
pub async fn ensure_dir<P: AsRef<Path>>(dir: P) -> std::io::Result<()> {
    let path = dir.as_ref();
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Write `content` to `dir/filename`, creating `dir` if needed.
pub async fn save_file<P: AsRef<Path>>(
    dir: P,
    filename: &str,
    content: &[u8],
) -> std::io::Result<PathBuf> {
    let dir = dir.as_ref();
    ensure_dir(dir).await?;

    let file_path = dir.join(filename);
    tokio::fs::write(&file_path, content).await?;

    Ok(file_path)
}
