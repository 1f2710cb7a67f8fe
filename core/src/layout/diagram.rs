//! Deterministic placement for the five diagram kinds.
//!
//! Each layout fills a target rectangle and returns abstract shapes; the
//! caller decides where on the slide that rectangle sits. Nothing here
//! fails: input that cannot be drawn yields an empty layout and a warning.

use slide_common::{DiagramKind, DiagramSpec, Rgb, ThemeSpec};
use std::f64::consts::PI;

use super::{Align, Connector, DiagramLayout, Element, Geometry, Point, Rect, Shape, TextStyle};

/// Rows rendered per comparison column; items past this are dropped.
pub const MAX_COMPARISON_ROWS: usize = 6;

const CONNECTOR_PT: f64 = 2.0;

const FLOW_BOX_HEIGHT: f64 = 0.7;
const FLOW_BOX_MAX_WIDTH: f64 = 5.0;
/// Share of the area height boxes may take before they shrink.
const FLOW_FILL: f64 = 0.8;

const TIMELINE_LINE_RATIO: f64 = 0.35;
const TIMELINE_MARKER: f64 = 0.3;
const TIMELINE_LABEL_MAX_WIDTH: f64 = 1.8;
const TIMELINE_LABEL_HEIGHT: f64 = 1.0;
/// Label width as a share of marker spacing. Below 2/3 neighbours cannot touch.
const TIMELINE_LABEL_SPACING: f64 = 0.6;

const COMPARISON_HEADER: f64 = 0.5;
const COMPARISON_ROW: f64 = 0.55;
const COMPARISON_GAP: f64 = 0.2;
const CHECK_MARK: &str = "\u{2713}";

const CYCLE_RADIUS: f64 = 1.6;
const CYCLE_NODE: f64 = 1.1;

/// Lay out `spec` inside `area`.
pub fn layout_diagram(spec: &DiagramSpec, area: Rect, theme: &ThemeSpec) -> DiagramLayout {
    if !area.is_drawable() {
        tracing::warn!(
            "Skipping {} diagram: target area {:?} has no drawable size",
            spec.kind,
            area
        );
        return DiagramLayout::default();
    }
    if !spec.has_enough_items() {
        tracing::warn!(
            "Skipping {} diagram: {} item(s), need at least {}",
            spec.kind,
            spec.items.len(),
            spec.kind.min_items()
        );
        return DiagramLayout::default();
    }

    let labels = spec.labels();
    match spec.kind {
        DiagramKind::Flowchart => flowchart(&labels, area, theme),
        DiagramKind::Timeline => timeline(&labels, area, theme),
        DiagramKind::Comparison => {
            let (left, right) = split_comparison(&labels);
            comparison(left, right, area, theme)
        }
        DiagramKind::Cycle => cycle(&labels, area, theme),
        DiagramKind::Pyramid => pyramid(&labels, area, theme),
    }
}

/// Left and right halves of a comparison, split at `len / 2`.
pub fn split_comparison<T>(items: &[T]) -> (&[T], &[T]) {
    items.split_at(items.len() / 2)
}

/// Node angles in degrees: first node on top, then clockwise on screen.
pub fn cycle_angles(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| -90.0 + i as f64 * 360.0 / n as f64)
        .collect()
}

fn node_text(size_pt: f64) -> TextStyle {
    TextStyle::new(size_pt, Rgb::WHITE).bold().centered()
}

fn flowchart(labels: &[String], area: Rect, theme: &ThemeSpec) -> DiagramLayout {
    let n = labels.len() as f64;
    let box_height = FLOW_BOX_HEIGHT.min(area.height * FLOW_FILL / n);
    let gap = (area.height - box_height * n) / (n + 1.0);
    let box_width = (area.width * 0.8).min(FLOW_BOX_MAX_WIDTH);
    let x = area.x + (area.width - box_width) / 2.0;
    let font = (14.0 * box_height / FLOW_BOX_HEIGHT).max(8.0);

    let nodes: Vec<Shape> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let y = area.y + gap * (i as f64 + 1.0) + box_height * i as f64;
            Shape::new(Geometry::RoundRect, Rect::new(x, y, box_width, box_height))
                .filled(theme.alternating(i))
                .with_text(vec![label.clone()], node_text(font))
        })
        .collect();

    let connectors = nodes
        .windows(2)
        .map(|pair| {
            Connector::arrow(
                pair[0].frame.bottom_center(),
                pair[1].frame.top_center(),
                theme.text,
                CONNECTOR_PT,
            )
        })
        .collect();

    DiagramLayout {
        nodes,
        connectors,
        ..DiagramLayout::default()
    }
}

fn timeline(labels: &[String], area: Rect, theme: &ThemeSpec) -> DiagramLayout {
    let n = labels.len();
    let line_y = area.y + area.height * TIMELINE_LINE_RATIO;
    // Marker centres run along the baseline inset by one marker radius.
    let track_left = area.x + TIMELINE_MARKER / 2.0;
    let track_width = (area.width - TIMELINE_MARKER).max(0.0);
    let spacing = if n > 1 {
        track_width / (n - 1) as f64
    } else {
        0.0
    };
    let label_width = if n > 1 {
        (spacing * TIMELINE_LABEL_SPACING).min(TIMELINE_LABEL_MAX_WIDTH)
    } else {
        TIMELINE_LABEL_MAX_WIDTH
    }
    .min(area.width);
    let label_y = line_y + TIMELINE_MARKER / 2.0 + 0.1;
    let label_height = TIMELINE_LABEL_HEIGHT.min(area.bottom() - label_y).max(0.2);

    let mut label_style = TextStyle::new(12.0, theme.text);
    label_style.align = Align::Center;

    let baseline = Connector::line(
        Point::new(area.x, line_y),
        Point::new(area.right(), line_y),
        theme.secondary,
        3.0,
    );

    let mut layout = DiagramLayout {
        decorations: vec![Element::Connector(baseline)],
        ..DiagramLayout::default()
    };
    for (i, label) in labels.iter().enumerate() {
        let x = track_left + spacing * i as f64;
        layout.nodes.push(
            Shape::new(
                Geometry::Ellipse,
                Rect::centered_square(Point::new(x, line_y), TIMELINE_MARKER),
            )
            .filled(theme.alternating(i)),
        );

        let label_x = (x - label_width / 2.0)
            .min(area.right() - label_width)
            .max(area.x);
        layout.labels.push(Shape::text_box(
            Rect::new(label_x, label_y, label_width, label_height),
            vec![label.clone()],
            label_style.clone(),
        ));
    }
    layout
}

fn comparison(left: &[String], right: &[String], area: Rect, theme: &ThemeSpec) -> DiagramLayout {
    let rows = left.len().min(right.len()).min(MAX_COMPARISON_ROWS);
    let dropped = left.len() + right.len() - 2 * rows;
    if dropped > 0 {
        tracing::warn!(
            "Comparison shows {} row(s) per side; dropping {} of {} item(s)",
            rows,
            dropped,
            left.len() + right.len()
        );
    }

    let column_width = (area.width - COMPARISON_GAP) / 2.0;
    let header_height = COMPARISON_HEADER.min(area.height * 0.25);
    let row_height = if rows > 0 {
        COMPARISON_ROW.min((area.height - header_height - COMPARISON_GAP) / rows as f64)
    } else {
        0.0
    };

    let mut layout = DiagramLayout::default();
    let columns = [
        ("Option A", theme.primary, left),
        ("Option B", theme.secondary, right),
    ];
    for (col, (heading, color, items)) in columns.iter().enumerate() {
        let x = area.x + col as f64 * (column_width + COMPARISON_GAP);
        layout.decorations.push(Element::Shape(
            Shape::new(Geometry::Rect, Rect::new(x, area.y, column_width, header_height))
                .filled(*color)
                .with_text(vec![heading.to_string()], node_text(16.0)),
        ));

        for (row, item) in items.iter().take(rows).enumerate() {
            let y = area.y + header_height + COMPARISON_GAP + row as f64 * row_height;
            layout.nodes.push(
                Shape::new(Geometry::Rect, Rect::new(x, y, column_width, row_height))
                    .outlined(*color, 1.0)
                    .with_text(
                        vec![format!("{CHECK_MARK} {item}")],
                        TextStyle::new(14.0, theme.text),
                    ),
            );
        }
    }
    layout
}

fn cycle(labels: &[String], area: Rect, theme: &ThemeSpec) -> DiagramLayout {
    let n = labels.len();
    let center = area.center();
    let extent = area.width.min(area.height);
    let mut node = CYCLE_NODE.min(extent / 2.0);
    let radius = CYCLE_RADIUS.min((extent - node) / 2.0);
    if n > 1 {
        let chord = 2.0 * radius * (PI / n as f64).sin();
        node = node.min(chord * 0.9);
    }
    let font = (11.0 * node / CYCLE_NODE).max(7.0);

    let centers: Vec<Point> = cycle_angles(n)
        .into_iter()
        .map(|deg| {
            let rad = deg.to_radians();
            Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
        })
        .collect();

    let nodes = centers
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (c, label))| {
            Shape::new(Geometry::Ellipse, Rect::centered_square(*c, node))
                .filled(theme.rotating(i))
                .with_text(vec![(i + 1).to_string(), label.clone()], node_text(font))
        })
        .collect();

    let mut connectors = Vec::new();
    if n > 1 {
        for i in 0..n {
            let (a, b) = (centers[i], centers[(i + 1) % n]);
            let distance = a.distance(b);
            let (ux, uy) = ((b.x - a.x) / distance, (b.y - a.y) / distance);
            let r = node / 2.0;
            connectors.push(Connector::arrow(
                Point::new(a.x + ux * r, a.y + uy * r),
                Point::new(b.x - ux * r, b.y - uy * r),
                theme.text,
                CONNECTOR_PT,
            ));
        }
    }

    DiagramLayout {
        nodes,
        connectors,
        ..DiagramLayout::default()
    }
}

fn pyramid(labels: &[String], area: Rect, theme: &ThemeSpec) -> DiagramLayout {
    let n = labels.len() as f64;
    let band_height = area.height / n;
    let font = (14.0 * band_height / 0.7).clamp(8.0, 14.0);

    let nodes = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            // Narrowest at the top, full width at the base.
            let width = area.width * (i as f64 + 1.0) / n;
            let frame = Rect::new(
                area.x + (area.width - width) / 2.0,
                area.y + band_height * i as f64,
                width,
                band_height,
            );
            Shape::new(Geometry::Rect, frame)
                .filled(theme.rotating(i))
                .with_text(vec![label.clone()], node_text(font))
        })
        .collect();

    DiagramLayout {
        nodes,
        ..DiagramLayout::default()
    }
}
