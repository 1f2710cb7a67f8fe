use slide_common::{theme, DiagramKind, GenerationOptions};

const STYLE_GUIDANCE: [(&str, &str); 6] = [
    (
        "professional",
        "Use formal language, focus on business value and ROI, include data and metrics",
    ),
    (
        "educational",
        "Use clear explanations, include learning objectives, break down complex concepts",
    ),
    (
        "technical",
        "Use technical terminology, include detailed examples, focus on implementation",
    ),
    (
        "creative",
        "Use engaging language, include storytelling elements, focus on inspiration",
    ),
    (
        "minimalist",
        "Use concise points, minimal text per slide, focus on key takeaways",
    ),
    (
        "playful",
        "Use casual language, include fun analogies, make it engaging and light",
    ),
];

/// Guidance sentence for a style; unknown styles read as professional.
pub fn style_guidance(style: &str) -> &'static str {
    let wanted = style.trim().to_ascii_lowercase();
    STYLE_GUIDANCE
        .iter()
        .find(|(name, _)| *name == wanted)
        .or_else(|| STYLE_GUIDANCE.first())
        .map(|(_, guidance)| *guidance)
        .unwrap_or_default()
}

/// Build the slide-generation prompt for `options`.
pub fn build_prompt(options: &GenerationOptions) -> String {
    let theme_name = theme(&options.theme).map(|t| t.name).unwrap_or("Default");
    let audience = if options.audience.is_empty() {
        "General audience"
    } else {
        options.audience.as_str()
    };
    let include_images = options.images.enabled();

    let mut field_lines = vec![
        "- title: Clear, engaging title (max 10 words)".to_string(),
        "- bullets: 3-5 concise bullet points".to_string(),
        "- notes: Detailed speaker notes".to_string(),
    ];
    if include_images {
        field_lines.push(
            "- image_search: SHORT search query for free stock photos (2-4 words max), only where an image adds value"
                .to_string(),
        );
    }
    if options.include_code {
        field_lines.push("- code: Relevant code example with proper syntax".to_string());
    }
    if options.include_diagrams {
        let kinds = DiagramKind::ALL.map(|k| k.as_str()).join(", ");
        field_lines.push(format!(
            "- diagram (optional): {{\"type\": one of {kinds}, \"items\": [short labels]}} for slides that explain a process, sequence, contrast, loop or hierarchy"
        ));
    }

    let example = example_slide(include_images, options.include_code, options.include_diagrams);

    let mut checks = vec![
        "- The presentation has a logical flow from introduction to conclusion",
        "- The last slide is a conclusion or summary",
    ];
    if options.include_diagrams {
        checks.push("- Diagrams have between 2 and 6 items");
    }

    format!(
        r#"Create a {count}-slide presentation based on this prompt:

{topic}

STYLE: {style}
STYLE GUIDANCE: {guidance}
AUDIENCE: {audience}
THEME: {theme_name}

Generate {count} slides in valid JSON format. Each slide should have:
{fields}

Return ONLY a JSON object like:
{{
  "slides": [
    {example},
    {example}
  ]
}}

Make sure:
{checks}

Make the content engaging, well-structured, and appropriate for the theme and audience.
For image_search queries, use simple, generic terms like "technology", "team meeting", "data analytics"."#,
        count = options.num_slides,
        topic = options.topic,
        style = options.style,
        guidance = style_guidance(&options.style),
        fields = field_lines.join("\n"),
        checks = checks.join("\n"),
    )
}

fn example_slide(images: bool, code: bool, diagrams: bool) -> String {
    let mut fields = vec![
        r#""title": "Slide Title""#,
        r#""bullets": ["Point 1", "Point 2", "Point 3"]"#,
        r#""notes": "Speaker notes""#,
    ];
    if images {
        fields.push(r#""image_search": "short search query""#);
    }
    if code {
        fields.push(r#""code": "code example here""#);
    }
    if diagrams {
        fields.push(r#""diagram": {"type": "flowchart", "items": ["Step 1", "Step 2", "Step 3"]}"#);
    }
    format!("{{{}}}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_common::ImageMode;

    #[test]
    fn unknown_style_falls_back_to_professional() {
        assert_eq!(style_guidance("baroque"), style_guidance("professional"));
        assert!(style_guidance("Playful").contains("casual"));
    }

    #[test]
    fn prompt_mentions_request_fields() {
        let mut options = GenerationOptions::new("Ownership in Rust");
        options.num_slides = 5;
        options.theme = "tech_dark".to_string();
        let prompt = build_prompt(&options);
        assert!(prompt.contains("Create a 5-slide presentation"));
        assert!(prompt.contains("Ownership in Rust"));
        assert!(prompt.contains("THEME: Tech Dark"));
        assert!(prompt.contains("AUDIENCE: General audience"));
        assert!(prompt.contains(r#""slides""#));
    }

    #[test]
    fn optional_fields_follow_flags() {
        let mut options = GenerationOptions::new("Topic");
        options.include_diagrams = false;
        let plain = build_prompt(&options);
        assert!(!plain.contains("image_search\":"));
        assert!(!plain.contains("\"code\""));
        assert!(!plain.contains("\"diagram\""));

        options.images = ImageMode::Stock;
        options.include_code = true;
        options.include_diagrams = true;
        let full = build_prompt(&options);
        assert!(full.contains(r#""image_search": "short search query""#));
        assert!(full.contains(r#""code": "code example here""#));
        assert!(full.contains("pyramid"));
    }

    #[test]
    fn diagram_rules_only_when_diagrams_are_wanted() {
        let mut options = GenerationOptions::new("Topic");
        options.include_diagrams = false;
        let plain = build_prompt(&options);
        assert!(!plain.contains("Diagrams have"));
        assert!(plain.contains("- The last slide is a conclusion or summary\n\nMake the content"));

        options.include_diagrams = true;
        let with = build_prompt(&options);
        assert!(with.contains("- Diagrams have between 2 and 6 items\n\nMake the content"));
    }
}
