//! DrawingML for individual slide elements.

use quick_xml::escape::escape;
use slide_common::Rgb;
use std::fmt::Write as FmtWrite;

use super::{emu, pt_emu, RenderError};
use crate::layout::{Align, Connector, Picture, Rect, Shape, Stroke, TextBlock};

/// Bullet indent, in EMU.
const BULLET_INDENT: i64 = 342_900;

/// Escape for element text and attribute values, dropping characters XML
/// 1.0 cannot carry at all.
pub(crate) fn escape_text(text: &str) -> String {
    let clean: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n'))
        .collect();
    escape(clean.as_str()).into_owned()
}

fn write_xfrm(xml: &mut String, frame: &Rect, flip: (bool, bool)) -> Result<(), RenderError> {
    xml.push_str("<a:xfrm");
    if flip.0 {
        xml.push_str(r#" flipH="1""#);
    }
    if flip.1 {
        xml.push_str(r#" flipV="1""#);
    }
    xml.push('>');
    write!(
        xml,
        r#"<a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/>"#,
        emu(frame.x),
        emu(frame.y),
        emu(frame.width),
        emu(frame.height)
    )?;
    xml.push_str("</a:xfrm>");
    Ok(())
}

fn write_solid_fill(xml: &mut String, color: Rgb) -> Result<(), RenderError> {
    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        color.hex()
    )?;
    Ok(())
}

fn write_line(xml: &mut String, stroke: Option<&Stroke>, arrow: bool) -> Result<(), RenderError> {
    match stroke {
        Some(stroke) => {
            write!(xml, r#"<a:ln w="{}">"#, pt_emu(stroke.width_pt))?;
            write_solid_fill(xml, stroke.color)?;
            if arrow {
                xml.push_str(r#"<a:tailEnd type="triangle" w="med" len="med"/>"#);
            }
            xml.push_str("</a:ln>");
        }
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    Ok(())
}

pub(crate) fn write_shape(xml: &mut String, id: u32, shape: &Shape) -> Result<(), RenderError> {
    let (name, tx_box) = if shape.is_text_only() {
        ("TextBox", r#" txBox="1""#)
    } else {
        ("Shape", "")
    };
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{id}" name="{name} {id}"/><p:cNvSpPr{tx_box}/><p:nvPr/>"#
    )?;
    xml.push_str("</p:nvSpPr><p:spPr>");
    write_xfrm(xml, &shape.frame, (false, false))?;
    write!(
        xml,
        r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
        shape.geometry.preset()
    )?;
    match shape.fill {
        Some(color) => write_solid_fill(xml, color)?,
        None => xml.push_str("<a:noFill/>"),
    }
    write_line(xml, shape.outline.as_ref(), false)?;
    xml.push_str("</p:spPr>");

    if let Some(text) = &shape.text {
        write_text_body(xml, text)?;
    }
    xml.push_str("</p:sp>");
    Ok(())
}

fn write_text_body(xml: &mut String, text: &TextBlock) -> Result<(), RenderError> {
    let style = &text.style;
    let anchor = if style.middle { "ctr" } else { "t" };
    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0" anchor="{anchor}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#
    )?;

    let algn = match style.align {
        Align::Left => "l",
        Align::Center => "ctr",
    };
    let lines = text
        .paragraphs
        .iter()
        .flat_map(|p| p.split('\n'))
        .map(|line| line.trim_end_matches('\r'));
    for line in lines {
        if style.bulleted {
            write!(
                xml,
                r#"<a:p><a:pPr marL="{BULLET_INDENT}" indent="-{BULLET_INDENT}" algn="{algn}">"#
            )?;
        } else {
            write!(xml, r#"<a:p><a:pPr algn="{algn}">"#)?;
        }
        if let Some(space) = style.space_before_pt {
            write!(
                xml,
                r#"<a:spcBef><a:spcPts val="{}"/></a:spcBef>"#,
                (space * 100.0).round() as i64
            )?;
        }
        if style.bulleted {
            xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
        } else {
            xml.push_str("<a:buNone/>");
        }
        xml.push_str("</a:pPr><a:r>");

        write!(
            xml,
            r#"<a:rPr lang="en-US" sz="{}" b="{}" dirty="0">"#,
            (style.size_pt * 100.0).round() as i64,
            u8::from(style.bold)
        )?;
        write_solid_fill(xml, style.color)?;
        if let Some(font) = style.font {
            let font = escape_text(font);
            write!(
                xml,
                r#"<a:latin typeface="{font}"/><a:cs typeface="{font}"/>"#
            )?;
        }
        write!(xml, "</a:rPr><a:t>{}</a:t></a:r></a:p>", escape_text(line))?;
    }
    xml.push_str("</p:txBody>");
    Ok(())
}

pub(crate) fn write_connector(
    xml: &mut String,
    id: u32,
    connector: &Connector,
) -> Result<(), RenderError> {
    let (from, to) = (connector.from, connector.to);
    let frame = Rect::new(
        from.x.min(to.x),
        from.y.min(to.y),
        (to.x - from.x).abs(),
        (to.y - from.y).abs(),
    );
    xml.push_str("<p:cxnSp><p:nvCxnSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{id}" name="Connector {id}"/><p:cNvCxnSpPr/><p:nvPr/>"#
    )?;
    xml.push_str("</p:nvCxnSpPr><p:spPr>");
    write_xfrm(xml, &frame, (to.x < from.x, to.y < from.y))?;
    xml.push_str(r#"<a:prstGeom prst="straightConnector1"><a:avLst/></a:prstGeom>"#);
    write_line(xml, Some(&connector.stroke), connector.arrow)?;
    xml.push_str("</p:spPr></p:cxnSp>");
    Ok(())
}

pub(crate) fn write_picture(
    xml: &mut String,
    id: u32,
    picture: &Picture,
    rel_id: &str,
) -> Result<(), RenderError> {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{id}" name="Picture {id}" descr="{}"/>"#,
        escape_text(&picture.description)
    )?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
    xml.push_str("</p:nvPicPr><p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{rel_id}"/>"#)?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>");
    write_xfrm(xml, &picture.frame, (false, false))?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}
