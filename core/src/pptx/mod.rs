//! Minimal PresentationML writer.
//!
//! Produces one master, one blank layout, a palette-derived theme and a
//! notes master, then one part per slide (plus a notes part for slides that
//! carry speaker notes). Every slide element is absolutely positioned, so no
//! placeholder inheritance is involved.

mod parts;
mod shapes;

use chrono::Utc;
use slide_common::ThemeSpec;
use std::io::{Cursor, Seek, Write};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::layout::{Canvas, Element, CANVAS_HEIGHT, CANVAS_WIDTH};
use parts::{rel_type, Relationship};

pub const EMU_PER_INCH: f64 = 914_400.0;
pub const EMU_PER_POINT: f64 = 12_700.0;
pub const SLIDE_WIDTH_EMU: i64 = (CANVAS_WIDTH * EMU_PER_INCH) as i64;
pub const SLIDE_HEIGHT_EMU: i64 = (CANVAS_HEIGHT * EMU_PER_INCH) as i64;

pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("XML generation failed: {0}")]
    Xml(#[from] std::fmt::Error),

    #[error("Package write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inches to EMU.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Points to EMU.
pub fn pt_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT).round() as i64
}

struct SlidePart {
    canvas: Canvas,
    notes: Option<String>,
}

/// Collects composed slides and serialises them as a `.pptx` package.
pub struct PresentationWriter<'a> {
    theme: &'a ThemeSpec,
    title: String,
    slides: Vec<SlidePart>,
}

impl<'a> PresentationWriter<'a> {
    pub fn new(theme: &'a ThemeSpec) -> Self {
        Self {
            theme,
            title: String::new(),
            slides: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a slide. Blank notes produce no notes part.
    pub fn add_slide(&mut self, canvas: Canvas, notes: &str) {
        let notes = Some(notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self.slides.push(SlidePart { canvas, notes });
    }

    /// Write the package and hand the underlying writer back.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, RenderError> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let slide_count = self.slides.len();
        let notes_indices: Vec<usize> = self
            .slides
            .iter()
            .enumerate()
            .filter(|(_, s)| s.notes.is_some())
            .map(|(i, _)| i + 1)
            .collect();

        let put = |zip: &mut ZipWriter<W>, name: &str, body: &str| -> Result<(), RenderError> {
            zip.start_file(name, deflated)?;
            zip.write_all(body.as_bytes())?;
            Ok(())
        };

        put(&mut zip, "[Content_Types].xml", &parts::content_types_xml(slide_count, &notes_indices)?)?;
        put(
            &mut zip,
            "_rels/.rels",
            &parts::relationships_xml(&[
                Relationship::new("rId1", rel_type("officeDocument"), "ppt/presentation.xml"),
                Relationship::new(
                    "rId2",
                    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
                    "docProps/core.xml",
                ),
                Relationship::new("rId3", rel_type("extended-properties"), "docProps/app.xml"),
            ])?,
        )?;
        put(&mut zip, "docProps/core.xml", &parts::core_props_xml(&self.title, Utc::now())?)?;
        put(
            &mut zip,
            "docProps/app.xml",
            &parts::app_props_xml(slide_count, notes_indices.len())?,
        )?;

        put(&mut zip, "ppt/presentation.xml", &parts::presentation_xml(slide_count)?)?;
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &parts::relationships_xml(&parts::presentation_rels(slide_count))?,
        )?;

        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", &parts::slide_master_xml()?)?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &parts::relationships_xml(&[
                Relationship::new("rId1", rel_type("slideLayout"), "../slideLayouts/slideLayout1.xml"),
                Relationship::new("rId2", rel_type("theme"), "../theme/theme1.xml"),
            ])?,
        )?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &parts::slide_layout_xml()?)?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &parts::relationships_xml(&[Relationship::new(
                "rId1",
                rel_type("slideMaster"),
                "../slideMasters/slideMaster1.xml",
            )])?,
        )?;
        put(&mut zip, "ppt/notesMasters/notesMaster1.xml", &parts::notes_master_xml()?)?;
        put(
            &mut zip,
            "ppt/notesMasters/_rels/notesMaster1.xml.rels",
            &parts::relationships_xml(&[Relationship::new(
                "rId1",
                rel_type("theme"),
                "../theme/theme2.xml",
            )])?,
        )?;
        let theme = parts::theme_xml(self.theme)?;
        put(&mut zip, "ppt/theme/theme1.xml", &theme)?;
        put(&mut zip, "ppt/theme/theme2.xml", &theme)?;

        let mut media_count = 0usize;
        for (index, slide) in self.slides.iter().enumerate() {
            let n = index + 1;
            let mut rels = vec![Relationship::new(
                "rId1",
                rel_type("slideLayout"),
                "../slideLayouts/slideLayout1.xml",
            )];
            if slide.notes.is_some() {
                rels.push(Relationship::new(
                    "rId2",
                    rel_type("notesSlide"),
                    format!("../notesSlides/notesSlide{n}.xml"),
                ));
            }

            let mut image_rels = Vec::new();
            for element in &slide.canvas.elements {
                if let Element::Picture(picture) = element {
                    media_count += 1;
                    let media_name = format!("image{media_count}.jpeg");
                    let rel_id = format!("rId{}", rels.len() + 1);
                    zip.start_file(format!("ppt/media/{media_name}"), stored)?;
                    zip.write_all(&picture.data)?;
                    rels.push(Relationship::new(
                        rel_id.clone(),
                        rel_type("image"),
                        format!("../media/{media_name}"),
                    ));
                    image_rels.push(rel_id);
                }
            }

            put(&mut zip, &format!("ppt/slides/slide{n}.xml"), &parts::slide_xml(&slide.canvas, &image_rels)?)?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{n}.xml.rels"),
                &parts::relationships_xml(&rels)?,
            )?;

            if let Some(notes) = &slide.notes {
                put(&mut zip, &format!("ppt/notesSlides/notesSlide{n}.xml"), &parts::notes_xml(notes)?)?;
                put(
                    &mut zip,
                    &format!("ppt/notesSlides/_rels/notesSlide{n}.xml.rels"),
                    &parts::relationships_xml(&[
                        Relationship::new("rId1", rel_type("notesMaster"), "../notesMasters/notesMaster1.xml"),
                        Relationship::new("rId2", rel_type("slide"), format!("../slides/slide{n}.xml")),
                    ])?,
                )?;
            }
        }

        Ok(zip.finish()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RenderError> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }
}
