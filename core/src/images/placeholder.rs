use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb as Pixel, RgbImage};

/// Characters per wrapped caption line.
const WRAP_COLUMNS: usize = 30;
const MAX_LINES: usize = 3;
const LINE_STEP: i64 = 50;
const SHADOW_OFFSET: i64 = 2;
const GLYPH_SIZE: i64 = 8;
const JPEG_QUALITY: u8 = 85;

/// Greedy word wrap: a line is closed as soon as adding the next word would
/// push it past `columns`. A single word longer than `columns` gets a line of
/// its own.
pub fn wrap_words(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Gradient card with `text` drawn across the middle.
pub fn render_placeholder(text: &str, width: u32, height: u32) -> RgbImage {
    let width = width.max(1);
    let height = height.max(1);
    let mut img = RgbImage::from_fn(width, height, |_, y| {
        let t = f64::from(y) / f64::from(height);
        Pixel([
            (100.0 + 155.0 * t) as u8,
            (150.0 + 105.0 * t) as u8,
            (200.0 + 55.0 * t) as u8,
        ])
    });

    let scale = ((f64::from(width) * 0.9) / (WRAP_COLUMNS as f64 * GLYPH_SIZE as f64))
        .floor()
        .clamp(1.0, 5.0) as i64;
    let lines = wrap_words(text, WRAP_COLUMNS);
    let drawn: Vec<&String> = lines.iter().take(MAX_LINES).collect();

    let mut y = i64::from(height) / 2 - drawn.len() as i64 * (LINE_STEP / 2);
    for line in drawn {
        let text_width = line.chars().count() as i64 * GLYPH_SIZE * scale;
        let x = (i64::from(width) - text_width) / 2;
        draw_text(&mut img, line, x + SHADOW_OFFSET, y + SHADOW_OFFSET, scale, Pixel([0, 0, 0]));
        draw_text(&mut img, line, x, y, scale, Pixel([255, 255, 255]));
        y += LINE_STEP;
    }
    img
}

/// Placeholder as JPEG bytes. Empty when encoding fails.
pub fn placeholder_jpeg(text: &str, width: u32, height: u32) -> Vec<u8> {
    let img = render_placeholder(text, width, height);
    let mut out = Vec::new();
    match JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&img) {
        Ok(()) => out,
        Err(e) => {
            tracing::warn!("Could not encode placeholder image: {e}");
            Vec::new()
        }
    }
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_text(img: &mut RgbImage, text: &str, x0: i64, y0: i64, scale: i64, color: Pixel<u8>) {
    for (i, c) in text.chars().enumerate() {
        let left = x0 + i as i64 * GLYPH_SIZE * scale;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                fill_block(
                    img,
                    left + col * scale,
                    y0 + row as i64 * scale,
                    scale,
                    color,
                );
            }
        }
    }
}

fn fill_block(img: &mut RgbImage, x: i64, y: i64, size: i64, color: Pixel<u8>) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    for py in y.max(0)..(y + size).min(h) {
        for px in x.max(0)..(x + size).min(w) {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
}
