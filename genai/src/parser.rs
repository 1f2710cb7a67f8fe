//! Turns model output into [`SlideSpec`]s.
//!
//! Models are asked for bare JSON but often wrap it in a fenced code block,
//! sometimes with a language tag and sometimes with prose around it. The
//! grammar accepted here is "optionally delimited JSON": the whole text is
//! parsed as JSON first, and only when that fails is the body of the first
//! fenced block (up to the last closing fence) parsed instead.

use serde_json::{Map, Value};
use slide_common::{DiagramItem, DiagramKind, DiagramSpec, SlideSpec};

use crate::error::{preview, ParseError};

const FENCE: &str = "```";
const UNTITLED: &str = "Untitled";
const IMAGE_QUERY_FIELDS: [&str; 3] = ["image_query", "image_search", "image_prompt"];

/// Parse a raw model response into an ordered slide list.
pub fn parse_slides(raw: &str) -> Result<Vec<SlideSpec>, ParseError> {
    let value = parse_delimited_json(raw)?;
    slides_from_value(&value, raw)
}

/// Parse `raw` as JSON, falling back to the body of a fenced block.
pub fn parse_delimited_json(raw: &str) -> Result<Value, ParseError> {
    let text = raw.trim();
    let first_error = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match fenced_body(text) {
        Some(body) => serde_json::from_str(body).map_err(|source| ParseError::Json {
            source,
            preview: preview(raw),
        }),
        None => Err(ParseError::Json {
            source: first_error,
            preview: preview(raw),
        }),
    }
}

/// Body between the first fence opener (and its optional language tag) and
/// the last fence closer. A missing closer takes the rest of the text.
fn fenced_body(text: &str) -> Option<&str> {
    let start = text.find(FENCE)?;
    let rest = &text[start + FENCE.len()..];
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(rest.len());
    let body = &rest[tag_len..];
    let body = match body.rfind(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    Some(body.trim())
}

fn slides_from_value(value: &Value, raw: &str) -> Result<Vec<SlideSpec>, ParseError> {
    let schema = |reason: String| ParseError::Schema {
        reason,
        preview: preview(raw),
    };

    let root = value
        .as_object()
        .ok_or_else(|| schema("expected a JSON object at the top level".to_string()))?;
    let slides = root
        .get("slides")
        .ok_or_else(|| schema("missing 'slides' field".to_string()))?
        .as_array()
        .ok_or_else(|| schema("'slides' is not an array".to_string()))?;

    slides
        .iter()
        .enumerate()
        .map(|(index, slide)| {
            slide
                .as_object()
                .map(normalize_slide)
                .ok_or_else(|| schema(format!("slide {} is not an object", index + 1)))
        })
        .collect()
}

fn normalize_slide(slide: &Map<String, Value>) -> SlideSpec {
    let title = non_empty_text(slide.get("title")).unwrap_or_else(|| UNTITLED.to_string());

    let bullets = match slide.get("bullets") {
        Some(Value::Array(items)) => items.iter().filter_map(|b| non_empty_text(Some(b))).collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    };

    let notes = match slide.get("notes") {
        Some(Value::String(notes)) => notes.clone(),
        _ => String::new(),
    };

    let image_query = IMAGE_QUERY_FIELDS
        .iter()
        .find_map(|field| non_empty_text(slide.get(*field)));

    SlideSpec {
        title,
        bullets,
        notes,
        code: non_empty_text(slide.get("code")),
        image_query,
        diagram: slide.get("diagram").and_then(normalize_diagram),
    }
}

fn normalize_diagram(value: &Value) -> Option<DiagramSpec> {
    let diagram = value.as_object()?;
    let kind_name = diagram
        .get("type")
        .or_else(|| diagram.get("kind"))
        .and_then(Value::as_str)?;

    let kind = match kind_name.parse::<DiagramKind>() {
        Ok(kind) => kind,
        Err(e) => {
            tracing::warn!("Dropping diagram: {e}");
            return None;
        }
    };

    let items = match diagram.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| serde_json::from_value::<DiagramItem>(item.clone()))
            .collect::<Result<Vec<_>, _>>()
            .ok()?,
        _ => Vec::new(),
    };

    Some(DiagramSpec { kind, items })
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"slides": [
        {"title": "Welcome", "bullets": ["a", "b"], "notes": "hello"},
        {"title": "Second"},
        {"bullets": ["x"], "image_search": "team meeting", "code": ""}
    ]}"#;

    #[test]
    fn parses_bare_json() {
        let slides = parse_slides(BODY).unwrap();
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[0].bullets, vec!["a", "b"]);
        assert_eq!(slides[0].notes, "hello");
    }

    #[test]
    fn fenced_json_yields_every_slide_with_defaults() {
        let raw = format!("```json\n{BODY}\n```");
        let slides = parse_slides(&raw).unwrap();
        assert_eq!(slides.len(), 3);

        assert_eq!(slides[1].title, "Second");
        assert!(slides[1].bullets.is_empty());
        assert_eq!(slides[1].notes, "");
        assert!(slides[1].code.is_none());

        assert_eq!(slides[2].title, "Untitled");
        assert_eq!(slides[2].image_query.as_deref(), Some("team meeting"));
        assert!(slides[2].code.is_none());
    }

    #[test]
    fn fence_without_language_tag_or_closer() {
        let raw = format!("```\n{BODY}");
        assert_eq!(parse_slides(&raw).unwrap().len(), 3);
    }

    #[test]
    fn fence_surrounded_by_prose() {
        let raw = format!("Here is your deck:\n```JSON\n{BODY}\n```\nEnjoy!");
        assert_eq!(parse_slides(&raw).unwrap().len(), 3);
    }

    #[test]
    fn inner_fences_inside_code_survive() {
        let raw = "```json\n{\"slides\": [{\"title\": \"T\", \"code\": \"```rust\\nfn main() {}\\n```\"}]}\n```";
        let slides = parse_slides(raw).unwrap();
        assert!(slides[0].code.as_deref().unwrap().contains("fn main"));
    }

    #[test]
    fn missing_slides_is_schema_error() {
        let err = parse_slides(r#"{"deck": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
        assert!(err.to_string().contains("slides"));
    }

    #[test]
    fn top_level_array_is_schema_error() {
        let err = parse_slides(r#"[{"title": "x"}]"#).unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
    }

    #[test]
    fn malformed_json_carries_preview() {
        let raw = format!("not json at all {}", "z".repeat(1000));
        let err = parse_slides(&raw).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
        assert_eq!(err.preview().chars().count(), 500);
        assert!(err.preview().starts_with("not json at all"));
    }

    #[test]
    fn non_object_slide_is_rejected() {
        let err = parse_slides(r#"{"slides": [{"title": "a"}, 7]}"#).unwrap_err();
        assert!(err.to_string().contains("slide 2"));
    }

    #[test]
    fn diagram_is_normalized() {
        let raw = r#"{"slides": [{"title": "Flow", "diagram": {"type": "Flowchart", "items": ["Plan", {"text": "Build"}, {"name": "Ship"}]}}]}"#;
        let slides = parse_slides(raw).unwrap();
        let diagram = slides[0].diagram.as_ref().unwrap();
        assert_eq!(diagram.kind, DiagramKind::Flowchart);
        assert_eq!(diagram.labels(), vec!["Plan", "Build", "Ship"]);
    }

    #[test]
    fn unknown_diagram_kind_is_dropped() {
        let raw = r#"{"slides": [{"title": "V", "diagram": {"type": "venn", "items": ["a"]}}]}"#;
        let slides = parse_slides(raw).unwrap();
        assert!(slides[0].diagram.is_none());
    }
}
