//! Package parts other than individual shapes.

use chrono::{DateTime, SecondsFormat, Utc};
use slide_common::ThemeSpec;
use std::fmt::Write as FmtWrite;

use super::shapes::{escape_text, write_connector, write_picture, write_shape};
use super::{emu, RenderError, SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};
use crate::layout::{Canvas, Element, CANVAS_HEIGHT, CANVAS_WIDTH};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_P: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const MASTER_ID: u32 = 2_147_483_648;
const LAYOUT_ID: u32 = 2_147_483_649;
const FIRST_SLIDE_ID: u32 = 256;

const GROUP_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;
const CLR_MAP: &str = r#"bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink""#;

/// Relationship type under the officeDocument namespace, e.g. `slide`.
pub(crate) fn rel_type(kind: &str) -> String {
    format!("{REL_BASE}/{kind}")
}

pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, rel_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            target: target.into(),
        }
    }
}

pub(crate) fn relationships_xml(rels: &[Relationship]) -> Result<String, RenderError> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.rel_type,
            escape_text(&rel.target)
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

pub(crate) fn content_types_xml(
    slide_count: usize,
    notes: &[usize],
) -> Result<String, RenderError> {
    const PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), format!("{PML}.presentation.main+xml")),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), format!("{PML}.slideMaster+xml")),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), format!("{PML}.slideLayout+xml")),
        ("/ppt/notesMasters/notesMaster1.xml".to_string(), format!("{PML}.notesMaster+xml")),
        ("/ppt/theme/theme1.xml".to_string(), "application/vnd.openxmlformats-officedocument.theme+xml".to_string()),
        ("/ppt/theme/theme2.xml".to_string(), "application/vnd.openxmlformats-officedocument.theme+xml".to_string()),
        ("/docProps/core.xml".to_string(), "application/vnd.openxmlformats-package.core-properties+xml".to_string()),
        ("/docProps/app.xml".to_string(), "application/vnd.openxmlformats-officedocument.extended-properties+xml".to_string()),
    ];
    for n in 1..=slide_count {
        overrides.push((format!("/ppt/slides/slide{n}.xml"), format!("{PML}.slide+xml")));
    }
    for n in notes {
        overrides.push((
            format!("/ppt/notesSlides/notesSlide{n}.xml"),
            format!("{PML}.notesSlide+xml"),
        ));
    }
    for (part, content_type) in overrides {
        write!(
            xml,
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

pub(crate) fn presentation_xml(slide_count: usize) -> Result<String, RenderError> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:presentation {NS_P} saveSubsetFonts="1">"#)?;
    write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="{MASTER_ID}" r:id="rId1"/></p:sldMasterIdLst>"#
    )?;
    xml.push_str(r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId3"/></p:notesMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for i in 0..slide_count {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + i as u32,
                i + 4
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(
        xml,
        r#"<p:sldSz cx="{SLIDE_WIDTH_EMU}" cy="{SLIDE_HEIGHT_EMU}"/><p:notesSz cx="{SLIDE_HEIGHT_EMU}" cy="{SLIDE_WIDTH_EMU}"/>"#
    )?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// Presentation-level rels: master, theme, notes master, then one per slide.
pub(crate) fn presentation_rels(slide_count: usize) -> Vec<Relationship> {
    let mut rels = vec![
        Relationship::new("rId1", rel_type("slideMaster"), "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", rel_type("theme"), "theme/theme1.xml"),
        Relationship::new("rId3", rel_type("notesMaster"), "notesMasters/notesMaster1.xml"),
    ];
    for n in 1..=slide_count {
        rels.push(Relationship::new(
            format!("rId{}", n + 3),
            rel_type("slide"),
            format!("slides/slide{n}.xml"),
        ));
    }
    rels
}

pub(crate) fn slide_master_xml() -> Result<String, RenderError> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    write!(xml, "<p:sldMaster {NS_P}>")?;
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    write!(xml, "<p:spTree>{GROUP_HEADER}</p:spTree></p:cSld>")?;
    write!(xml, "<p:clrMap {CLR_MAP}/>")?;
    write!(
        xml,
        r#"<p:sldLayoutIdLst><p:sldLayoutId id="{LAYOUT_ID}" r:id="rId1"/></p:sldLayoutIdLst>"#
    )?;
    xml.push_str("<p:txStyles>");
    for (tag, size) in [("titleStyle", 4400), ("bodyStyle", 2000), ("otherStyle", 1800)] {
        write!(
            xml,
            r#"<p:{tag}><a:lvl1pPr><a:defRPr sz="{size}"/></a:lvl1pPr></p:{tag}>"#
        )?;
    }
    xml.push_str("</p:txStyles></p:sldMaster>");
    Ok(xml)
}

pub(crate) fn slide_layout_xml() -> Result<String, RenderError> {
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:sldLayout {NS_P} type="blank" preserve="1">"#)?;
    write!(xml, r#"<p:cSld name="Blank"><p:spTree>{GROUP_HEADER}</p:spTree></p:cSld>"#)?;
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    Ok(xml)
}

pub(crate) fn notes_master_xml() -> Result<String, RenderError> {
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECL);
    write!(xml, "<p:notesMaster {NS_P}>")?;
    write!(xml, "<p:cSld><p:spTree>{GROUP_HEADER}</p:spTree></p:cSld>")?;
    write!(xml, "<p:clrMap {CLR_MAP}/></p:notesMaster>")?;
    Ok(xml)
}

/// Office theme whose colour scheme is the deck's palette.
pub(crate) fn theme_xml(theme: &ThemeSpec) -> Result<String, RenderError> {
    let name = escape_text(theme.name);
    let mut xml = String::with_capacity(3072);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="{name}"><a:themeElements>"#
    )?;

    write!(xml, r#"<a:clrScheme name="{name}">"#)?;
    let scheme = [
        ("dk1", "000000".to_string()),
        ("lt1", "FFFFFF".to_string()),
        ("dk2", theme.primary.hex()),
        ("lt2", theme.background.hex()),
        ("accent1", theme.primary.hex()),
        ("accent2", theme.secondary.hex()),
        ("accent3", theme.accent.hex()),
        ("accent4", theme.text.hex()),
        ("accent5", "4BACC6".to_string()),
        ("accent6", "F79646".to_string()),
        ("hlink", "0563C1".to_string()),
        ("folHlink", "954F72".to_string()),
    ];
    for (slot, hex) in scheme {
        write!(xml, r#"<a:{slot}><a:srgbClr val="{hex}"/></a:{slot}>"#)?;
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Office">"#);
    for (tag, face) in [("majorFont", "Calibri Light"), ("minorFont", "Calibri")] {
        write!(
            xml,
            r#"<a:{tag}><a:latin typeface="{face}"/><a:ea typeface=""/><a:cs typeface=""/></a:{tag}>"#
        )?;
    }
    xml.push_str("</a:fontScheme>");

    const PH_FILL: &str = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    xml.push_str(r#"<a:fmtScheme name="Office"><a:fillStyleLst>"#);
    xml.push_str(&PH_FILL.repeat(3));
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        write!(xml, r#"<a:ln w="{width}">{PH_FILL}</a:ln>"#)?;
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    xml.push_str(&"<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3));
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    xml.push_str(&PH_FILL.repeat(3));
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");

    xml.push_str("</a:themeElements></a:theme>");
    Ok(xml)
}

/// One slide. `image_rels` holds the relationship id of each picture on the
/// canvas, in paint order.
pub(crate) fn slide_xml(canvas: &Canvas, image_rels: &[String]) -> Result<String, RenderError> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    write!(xml, "<p:sld {NS_P}><p:cSld>")?;
    if let Some(color) = canvas.background {
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            color.hex()
        )?;
    }
    xml.push_str("<p:spTree>");
    xml.push_str(GROUP_HEADER);

    let mut pictures = image_rels.iter();
    for (index, element) in canvas.elements.iter().enumerate() {
        let id = index as u32 + 2;
        match element {
            Element::Shape(shape) => write_shape(&mut xml, id, shape)?,
            Element::Connector(connector) => write_connector(&mut xml, id, connector)?,
            Element::Picture(picture) => match pictures.next() {
                Some(rel_id) => write_picture(&mut xml, id, picture, rel_id)?,
                None => tracing::warn!("Picture without a media relationship skipped"),
            },
        }
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(xml)
}

pub(crate) fn notes_xml(notes: &str) -> Result<String, RenderError> {
    let mut xml = String::with_capacity(1024 + notes.len());
    xml.push_str(XML_DECL);
    write!(xml, "<p:notes {NS_P}><p:cSld><p:spTree>")?;
    xml.push_str(GROUP_HEADER);

    xml.push_str("<p:sp><p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="2" name="Notes Placeholder 1"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>"#);
    // Notes pages are portrait: the slide's width runs down the page.
    let margin = 0.75;
    write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
        emu(margin),
        emu(CANVAS_WIDTH / 2.0),
        emu(CANVAS_HEIGHT - 2.0 * margin),
        emu(CANVAS_WIDTH / 2.0 - margin)
    )?;
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    for line in notes.lines() {
        write!(
            xml,
            r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
            escape_text(line)
        )?;
    }
    xml.push_str("</p:txBody></p:sp>");
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>");
    Ok(xml)
}

pub(crate) fn core_props_xml(title: &str, created: DateTime<Utc>) -> Result<String, RenderError> {
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    write!(xml, "<dc:title>{}</dc:title>", escape_text(title))?;
    xml.push_str("<dc:creator>slide</dc:creator>");
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    write!(
        xml,
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>"#
    )?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

pub(crate) fn app_props_xml(slide_count: usize, notes_count: usize) -> Result<String, RenderError> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#);
    write!(
        xml,
        "<Application>slide</Application><Slides>{slide_count}</Slides><Notes>{notes_count}</Notes>"
    )?;
    xml.push_str("</Properties>");
    Ok(xml)
}
