use slide_common::{Rgb, SlideSpec, ThemeSpec};

use super::{layout_diagram, Canvas, Connector, Picture, Point, Rect, Shape, TextStyle};

/// Holds the diagram, or the image when there is no diagram.
pub const RIGHT_COLUMN: Rect = Rect {
    x: 6.0,
    y: 1.7,
    width: 3.5,
    height: 4.0,
};

const TITLE_FRAME: Rect = Rect {
    x: 0.5,
    y: 0.3,
    width: 9.0,
    height: 1.0,
};
const RULE_Y: f64 = 1.4;
const RULE_PT: f64 = 3.0;

const CONTENT_LEFT: f64 = 0.5;
const CONTENT_TOP: f64 = 1.7;
const CONTENT_WIDTH: f64 = 9.0;
const NARROW_WIDTH: f64 = 5.0;
const BULLETS_HEIGHT: f64 = 4.5;

const CODE_TOP: f64 = 5.5;
const CODE_HEIGHT: f64 = 1.5;
const CODE_FONT: &str = "Courier New";
const CODE_BACKGROUND: Rgb = Rgb(40, 42, 54);
const CODE_FOREGROUND: Rgb = Rgb(248, 248, 242);

/// Place every part of `slide` on a fresh canvas.
///
/// `image` is the already-acquired JPEG for the slide, if any. A diagram
/// takes precedence over the image for the right column; a diagram on a
/// slide without bullets gets the whole content area instead.
pub fn compose_slide(slide: &SlideSpec, theme: &ThemeSpec, image: Option<&[u8]>) -> Canvas {
    let mut canvas = Canvas::new();
    canvas.background = Some(theme.background);

    canvas.add_shape(Shape::text_box(
        TITLE_FRAME,
        vec![slide.title.clone()],
        TextStyle::new(44.0, theme.primary).bold(),
    ));
    canvas.add_connector(Connector::line(
        Point::new(CONTENT_LEFT, RULE_Y),
        Point::new(CONTENT_LEFT + CONTENT_WIDTH, RULE_Y),
        theme.accent,
        RULE_PT,
    ));

    let content_bottom = if slide.code.is_some() {
        CODE_TOP - 0.1
    } else {
        CONTENT_TOP + BULLETS_HEIGHT
    };
    let mut width = CONTENT_WIDTH;
    let mut column_used = false;

    if let Some(diagram) = &slide.diagram {
        let area = if slide.bullets.is_empty() {
            Rect::new(
                CONTENT_LEFT,
                CONTENT_TOP,
                CONTENT_WIDTH,
                content_bottom - CONTENT_TOP,
            )
        } else {
            RIGHT_COLUMN
        };
        let layout = layout_diagram(diagram, area, theme);
        if !layout.is_empty() {
            canvas.add_layout(layout);
            column_used = true;
        }
    }

    if !column_used {
        if let Some(data) = image.filter(|data| !data.is_empty()) {
            canvas.add_picture(Picture {
                frame: RIGHT_COLUMN,
                data: data.to_vec(),
                description: slide.image_query.clone().unwrap_or_default(),
            });
            column_used = true;
        }
    }
    if column_used && !slide.bullets.is_empty() {
        width = NARROW_WIDTH;
    }

    if !slide.bullets.is_empty() {
        canvas.add_shape(Shape::text_box(
            Rect::new(CONTENT_LEFT, CONTENT_TOP, width, content_bottom - CONTENT_TOP),
            slide.bullets.clone(),
            TextStyle::new(20.0, theme.text).space_before(12.0).bulleted(),
        ));
    }

    if let Some(code) = &slide.code {
        canvas.add_shape(
            Shape::text_box(
                Rect::new(CONTENT_LEFT, CODE_TOP, width, CODE_HEIGHT),
                code.lines().map(str::to_string).collect(),
                TextStyle::new(14.0, CODE_FOREGROUND).font(CODE_FONT),
            )
            .filled(CODE_BACKGROUND),
        );
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Element, Geometry};
    use slide_common::{theme, DiagramKind, DiagramSpec};

    fn palette() -> &'static ThemeSpec {
        theme("tech_dark").unwrap()
    }

    fn bullet_box(canvas: &Canvas) -> &Shape {
        canvas
            .shapes()
            .find(|s| s.text.as_ref().is_some_and(|t| t.style.bulleted))
            .unwrap()
    }

    #[test]
    fn plain_slide_has_title_rule_and_bullets() {
        let slide = SlideSpec::new("Intro").with_bullets(["one", "two"]);
        let canvas = compose_slide(&slide, palette(), None);

        assert_eq!(canvas.background, Some(palette().background));
        assert_eq!(canvas.elements.len(), 3);

        let title = canvas.shapes().next().unwrap();
        assert_eq!(title.frame, TITLE_FRAME);
        let style = &title.text.as_ref().unwrap().style;
        assert_eq!(style.size_pt, 44.0);
        assert!(style.bold);
        assert_eq!(style.color, palette().primary);

        assert!(matches!(
            canvas.elements[1],
            Element::Connector(c) if c.from.y == RULE_Y && c.to.x == 9.5 && !c.arrow
        ));

        let bullets = bullet_box(&canvas);
        assert_eq!(bullets.frame.width, CONTENT_WIDTH);
        assert_eq!(bullets.text.as_ref().unwrap().paragraphs, vec!["one", "two"]);
        assert_eq!(bullets.text.as_ref().unwrap().style.space_before_pt, Some(12.0));
    }

    #[test]
    fn empty_slide_still_renders() {
        let canvas = compose_slide(&SlideSpec::new("Only a title"), palette(), None);
        assert_eq!(canvas.elements.len(), 2);
    }

    #[test]
    fn diagram_beside_bullets_uses_right_column() {
        let slide = SlideSpec::new("Flow")
            .with_bullets(["why"])
            .with_diagram(DiagramSpec::new(DiagramKind::Flowchart, ["a", "b", "c"]));
        let canvas = compose_slide(&slide, palette(), Some(&[1u8, 2, 3][..]));

        assert_eq!(bullet_box(&canvas).frame.width, NARROW_WIDTH);
        assert_eq!(canvas.pictures().count(), 0);
        let boxes: Vec<&Shape> = canvas
            .shapes()
            .filter(|s| s.geometry == Geometry::RoundRect)
            .collect();
        assert_eq!(boxes.len(), 3);
        assert!(boxes.iter().all(|s| RIGHT_COLUMN.contains(&s.frame)));
    }

    #[test]
    fn diagram_without_bullets_takes_full_width() {
        let slide = SlideSpec::new("Steps")
            .with_diagram(DiagramSpec::new(DiagramKind::Pyramid, ["top", "middle", "base"]));
        let canvas = compose_slide(&slide, palette(), None);
        let widest = canvas
            .shapes()
            .filter(|s| s.fill.is_some())
            .map(|s| s.frame.width)
            .fold(0.0, f64::max);
        assert_eq!(widest, CONTENT_WIDTH);
    }

    #[test]
    fn unrenderable_diagram_leaves_room_for_image() {
        let slide = SlideSpec::new("Versus")
            .with_bullets(["x"])
            .with_diagram(DiagramSpec::new(DiagramKind::Comparison, ["only one"]));
        let canvas = compose_slide(&slide, palette(), Some(&[0xFFu8, 0xD8][..]));
        let picture = canvas.pictures().next().unwrap();
        assert_eq!(picture.frame, RIGHT_COLUMN);
        assert_eq!(bullet_box(&canvas).frame.width, NARROW_WIDTH);
    }

    #[test]
    fn image_narrows_bullets() {
        let mut slide = SlideSpec::new("Team").with_bullets(["people"]);
        slide.image_query = Some("team meeting".to_string());
        let canvas = compose_slide(&slide, palette(), Some(&[0xFFu8, 0xD8][..]));
        assert_eq!(canvas.pictures().next().unwrap().description, "team meeting");
        assert_eq!(bullet_box(&canvas).frame.width, NARROW_WIDTH);

        let without = compose_slide(&slide, palette(), Some(&[][..]));
        assert_eq!(without.pictures().count(), 0);
        assert_eq!(bullet_box(&without).frame.width, CONTENT_WIDTH);
    }

    #[test]
    fn code_box_is_monospace_on_dark() {
        let mut slide = SlideSpec::new("Code").with_bullets(["look"]);
        slide.code = Some("fn main() {\n    println!(\"hi\");\n}".to_string());
        let canvas = compose_slide(&slide, palette(), None);

        let code = canvas
            .shapes()
            .find(|s| s.fill == Some(CODE_BACKGROUND))
            .unwrap();
        assert_eq!(code.frame, Rect::new(0.5, 5.5, 9.0, 1.5));
        let text = code.text.as_ref().unwrap();
        assert_eq!(text.paragraphs.len(), 3);
        assert_eq!(text.style.font, Some("Courier New"));
        assert_eq!(text.style.color, CODE_FOREGROUND);
        assert!(bullet_box(&canvas).frame.bottom() <= code.frame.y);
    }
}
