//! Shape geometry on the slide canvas.
//!
//! Everything here is measured in inches on a 10 x 7.5 canvas. The PPTX
//! writer converts to EMU at the very end, so layout code never sees
//! document units.

mod diagram;
mod slide;

pub use diagram::{cycle_angles, layout_diagram, split_comparison, MAX_COMPARISON_ROWS};
pub use slide::{compose_slide, RIGHT_COLUMN};

use slide_common::Rgb;

pub const CANVAS_WIDTH: f64 = 10.0;
pub const CANVAS_HEIGHT: f64 = 7.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `diameter` centred on `center`.
    pub fn centered_square(center: Point, diameter: f64) -> Self {
        Self::new(
            center.x - diameter / 2.0,
            center.y - diameter / 2.0,
            diameter,
            diameter,
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.bottom())
    }

    /// Positive, finite size.
    pub fn is_drawable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Interiors intersect; shared edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        self.x + EPS < other.right()
            && other.x + EPS < self.right()
            && self.y + EPS < other.bottom()
            && other.y + EPS < self.bottom()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        other.x + EPS >= self.x
            && other.y + EPS >= self.y
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// DrawingML preset geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rect,
    RoundRect,
    Ellipse,
}

impl Geometry {
    pub fn preset(&self) -> &'static str {
        match self {
            Geometry::Rect => "rect",
            Geometry::RoundRect => "roundRect",
            Geometry::Ellipse => "ellipse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_pt: f64,
    pub bold: bool,
    pub color: Rgb,
    pub font: Option<&'static str>,
    pub align: Align,
    /// Vertically centre the text in its frame.
    pub middle: bool,
    pub space_before_pt: Option<f64>,
    pub bulleted: bool,
}

impl TextStyle {
    pub fn new(size_pt: f64, color: Rgb) -> Self {
        Self {
            size_pt,
            bold: false,
            color,
            font: None,
            align: Align::Left,
            middle: false,
            space_before_pt: None,
            bulleted: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self.middle = true;
        self
    }

    pub fn font(mut self, font: &'static str) -> Self {
        self.font = Some(font);
        self
    }

    pub fn space_before(mut self, pt: f64) -> Self {
        self.space_before_pt = Some(pt);
        self
    }

    pub fn bulleted(mut self) -> Self {
        self.bulleted = true;
        self
    }
}

/// Text carried by a shape, one entry per paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub paragraphs: Vec<String>,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width_pt: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    pub frame: Rect,
    pub fill: Option<Rgb>,
    pub outline: Option<Stroke>,
    pub text: Option<TextBlock>,
}

impl Shape {
    pub fn new(geometry: Geometry, frame: Rect) -> Self {
        Self {
            geometry,
            frame,
            fill: None,
            outline: None,
            text: None,
        }
    }

    /// Unfilled rectangle holding text.
    pub fn text_box(frame: Rect, paragraphs: Vec<String>, style: TextStyle) -> Self {
        Self::new(Geometry::Rect, frame).with_text(paragraphs, style)
    }

    pub fn filled(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn outlined(mut self, color: Rgb, width_pt: f64) -> Self {
        self.outline = Some(Stroke { color, width_pt });
        self
    }

    pub fn with_text(mut self, paragraphs: Vec<String>, style: TextStyle) -> Self {
        self.text = Some(TextBlock { paragraphs, style });
        self
    }

    pub fn is_text_only(&self) -> bool {
        self.fill.is_none() && self.outline.is_none() && self.text.is_some()
    }
}

/// Straight line between two points, optionally ending in an arrowhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: Point,
    pub to: Point,
    pub stroke: Stroke,
    pub arrow: bool,
}

impl Connector {
    pub fn arrow(from: Point, to: Point, color: Rgb, width_pt: f64) -> Self {
        Self {
            from,
            to,
            stroke: Stroke { color, width_pt },
            arrow: true,
        }
    }

    pub fn line(from: Point, to: Point, color: Rgb, width_pt: f64) -> Self {
        Self {
            arrow: false,
            ..Self::arrow(from, to, color, width_pt)
        }
    }
}

/// Raster image placed in a frame. `data` is JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Rect,
    pub data: Vec<u8>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Shape(Shape),
    Connector(Connector),
    Picture(Picture),
}

/// Placed shapes for one diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramLayout {
    /// One per rendered item.
    pub nodes: Vec<Shape>,
    /// Text that sits beside a node rather than inside it.
    pub labels: Vec<Shape>,
    pub connectors: Vec<Connector>,
    /// Headers, baselines and other item-independent marks.
    pub decorations: Vec<Element>,
}

impl DiagramLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.labels.is_empty()
            && self.connectors.is_empty()
            && self.decorations.is_empty()
    }

    /// Paint order: decorations, connectors, nodes, labels.
    pub fn into_elements(self) -> Vec<Element> {
        let mut elements = self.decorations;
        elements.extend(self.connectors.into_iter().map(Element::Connector));
        elements.extend(self.nodes.into_iter().map(Element::Shape));
        elements.extend(self.labels.into_iter().map(Element::Shape));
        elements
    }
}

/// One slide's drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub background: Option<Rgb>,
    pub elements: Vec<Element>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            background: None,
            elements: Vec::new(),
        }
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.push(Element::Shape(shape));
    }

    pub fn add_connector(&mut self, connector: Connector) {
        self.push(Element::Connector(connector));
    }

    pub fn add_picture(&mut self, picture: Picture) {
        self.push(Element::Picture(picture));
    }

    pub fn add_layout(&mut self, layout: DiagramLayout) {
        self.elements.extend(layout.into_elements());
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.elements.iter().filter_map(|e| match e {
            Element::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.elements.iter().filter_map(|e| match e {
            Element::Picture(picture) => Some(picture),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_overlap_ignores_shared_edges() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.0, 1.0, 1.0);
        let c = Rect::new(0.5, 0.5, 1.0, 1.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn degenerate_rects_are_not_drawable() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_drawable());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_drawable());
        assert!(!Rect::new(0.0, 0.0, 1.0, -2.0).is_drawable());
        assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_drawable());
    }

    #[test]
    fn layout_paints_decorations_first() {
        let layout = DiagramLayout {
            nodes: vec![Shape::new(Geometry::Ellipse, Rect::new(0.0, 0.0, 1.0, 1.0))],
            labels: vec![],
            connectors: vec![Connector::arrow(
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Rgb::BLACK,
                2.0,
            )],
            decorations: vec![Element::Shape(Shape::new(
                Geometry::Rect,
                Rect::new(0.0, 0.0, 2.0, 2.0),
            ))],
        };
        let elements = layout.into_elements();
        assert!(matches!(elements[0], Element::Shape(ref s) if s.geometry == Geometry::Rect));
        assert!(matches!(elements[1], Element::Connector(_)));
        assert!(matches!(elements[2], Element::Shape(ref s) if s.geometry == Geometry::Ellipse));
    }
}
