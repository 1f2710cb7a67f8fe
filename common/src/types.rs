use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Render-ready description of one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramSpec>,
}

impl SlideSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
            notes: String::new(),
            code: None,
            image_query: None,
            diagram: None,
        }
    }

    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_diagram(mut self, diagram: DiagramSpec) -> Self {
        self.diagram = Some(diagram);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Flowchart,
    Timeline,
    Comparison,
    Cycle,
    Pyramid,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 5] = [
        DiagramKind::Flowchart,
        DiagramKind::Timeline,
        DiagramKind::Comparison,
        DiagramKind::Cycle,
        DiagramKind::Pyramid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Timeline => "timeline",
            DiagramKind::Comparison => "comparison",
            DiagramKind::Cycle => "cycle",
            DiagramKind::Pyramid => "pyramid",
        }
    }

    /// Fewest items the layout can place for this kind.
    pub fn min_items(&self) -> usize {
        match self {
            DiagramKind::Comparison => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DiagramKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown diagram kind: {s}"))
    }
}

/// One entry of a diagram: a bare label, a record carrying a label field,
/// or any other JSON scalar the model chose to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagramItem {
    Label(String),
    Record(Map<String, Value>),
    Other(Value),
}

impl DiagramItem {
    const LABEL_FIELDS: [&'static str; 3] = ["text", "title", "name"];

    /// Display string used by every diagram layout.
    pub fn display_text(&self) -> String {
        match self {
            DiagramItem::Label(label) => label.clone(),
            DiagramItem::Record(record) => Self::LABEL_FIELDS
                .iter()
                .find_map(|field| record.get(*field).filter(|v| !v.is_null()))
                .map(value_to_text)
                .unwrap_or_else(|| Value::Object(record.clone()).to_string()),
            DiagramItem::Other(value) => value_to_text(value),
        }
    }
}

impl From<&str> for DiagramItem {
    fn from(label: &str) -> Self {
        DiagramItem::Label(label.to_string())
    }
}

impl From<String> for DiagramItem {
    fn from(label: String) -> Self {
        DiagramItem::Label(label)
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub kind: DiagramKind,
    #[serde(default)]
    pub items: Vec<DiagramItem>,
}

impl DiagramSpec {
    pub fn new<I, T>(kind: DiagramKind, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DiagramItem>,
    {
        Self {
            kind,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(DiagramItem::display_text).collect()
    }

    pub fn has_enough_items(&self) -> bool {
        self.items.len() >= self.kind.min_items()
    }
}
