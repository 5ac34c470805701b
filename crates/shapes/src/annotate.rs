//! Label overlay for classified frames.
//!
//! Text is rendered with a small built-in 5x7 bitmap font so that annotating a
//! frame needs no font files.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::types::{ClassificationReport, ShapeResult};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, in font cells
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Draws each shape's outline and its label centred on the centroid
#[derive(Debug, Clone)]
pub struct Annotator {
    pub text_color: Rgb<u8>,
    pub shadow_color: Rgb<u8>,
    pub outline_color: Rgb<u8>,
    /// Pixels per font cell
    pub scale: u32,
    pub draw_outlines: bool,
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            text_color: Rgb([255, 255, 255]),
            shadow_color: Rgb([0, 0, 0]),
            outline_color: Rgb([0, 255, 0]),
            scale: 2,
            draw_outlines: true,
        }
    }
}

impl Annotator {
    pub fn annotate(&self, image: &mut RgbImage, report: &ClassificationReport) {
        for shape in &report.shapes {
            if self.draw_outlines {
                self.draw_outline(image, shape);
            }
            self.draw_label(image, shape);
        }
    }

    /// Rendered size of `text` in pixels
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let scale = self.scale.max(1);
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return (0, 0);
        }
        ((chars * GLYPH_ADVANCE - 1) * scale, GLYPH_HEIGHT * scale)
    }

    fn draw_outline(&self, image: &mut RgbImage, shape: &ShapeResult) {
        let vertices = &shape.polygon.vertices;
        if vertices.len() < 2 {
            return;
        }
        for (a, b) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
            draw_line_segment_mut(
                image,
                (a[0] as f32, a[1] as f32),
                (b[0] as f32, b[1] as f32),
                self.outline_color,
            );
        }
    }

    fn draw_label(&self, image: &mut RgbImage, shape: &ShapeResult) {
        let text = shape.label.to_string().to_uppercase();
        let (width, height) = self.text_size(&text);
        let x = shape.centroid[0].round() as i32 - (width / 2) as i32;
        let y = shape.centroid[1].round() as i32 - (height / 2) as i32;
        let scale = self.scale.max(1) as i32;

        // Shadow pass first so the text stays readable on any background
        self.draw_text(image, x + scale, y + scale, &text, self.shadow_color);
        self.draw_text(image, x, y, &text, self.text_color);
    }

    /// Draw `text` with its top-left corner at `(x, y)`; clipped to the image
    pub fn draw_text(&self, image: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        let scale = self.scale.max(1);
        let mut cursor = x;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                for (ry, bits) in rows.iter().enumerate() {
                    for rx in 0..GLYPH_WIDTH {
                        if bits & (1 << (GLYPH_WIDTH - 1 - rx)) != 0 {
                            let px = cursor + (rx * scale) as i32;
                            let py = y + ry as i32 * scale as i32;
                            draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
                        }
                    }
                }
            }
            cursor += (GLYPH_ADVANCE * scale) as i32;
        }
    }
}

/// 5x7 glyphs for the characters that appear in shape labels.
/// Each row uses the low five bits, bit 4 being the leftmost pixel.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        ' ' => [0; 7],
        _ => return None,
    };
    Some(rows)
}
