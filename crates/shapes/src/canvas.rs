//! Freehand stroke canvas, the producer of [`StrokeMask`] snapshots.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, BresenhamLineIter};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    error::{Result, ShapeError},
    types::StrokeMask,
};

pub const DRAW_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const ERASE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
pub const DRAW_THICKNESS: u32 = 5;
pub const ERASE_THICKNESS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum StrokeMode {
    Draw,
    Erase,
}

impl StrokeMode {
    pub fn color(self) -> Rgb<u8> {
        match self {
            StrokeMode::Draw => DRAW_COLOR,
            StrokeMode::Erase => ERASE_COLOR,
        }
    }

    pub fn thickness(self) -> u32 {
        match self {
            StrokeMode::Draw => DRAW_THICKNESS,
            StrokeMode::Erase => ERASE_THICKNESS,
        }
    }
}

/// RGB layer the user draws on, kept separate from the camera frame.
///
/// A stroke starts with [`begin_stroke`](Self::begin_stroke), paints a segment
/// on every [`extend_stroke`](Self::extend_stroke) and finishes with
/// [`end_stroke`](Self::end_stroke). Black pixels are empty.
#[derive(Debug, Clone)]
pub struct StrokeCanvas {
    image: RgbImage,
    mode: StrokeMode,
    cursor: Option<(i32, i32)>,
}

impl StrokeCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ShapeError::InvalidInput(format!(
                "canvas dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            image: RgbImage::new(width, height),
            mode: StrokeMode::Draw,
            cursor: None,
        })
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }

    /// Switch between drawing and erasing, returning the new mode
    pub fn toggle_mode(&mut self) -> StrokeMode {
        self.mode = match self.mode {
            StrokeMode::Draw => StrokeMode::Erase,
            StrokeMode::Erase => StrokeMode::Draw,
        };
        self.mode
    }

    pub fn is_stroking(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn begin_stroke(&mut self, x: i32, y: i32) {
        self.cursor = Some((x, y));
    }

    /// Paint from the last stroke position; ignored outside a stroke
    pub fn extend_stroke(&mut self, x: i32, y: i32) {
        if let Some(from) = self.cursor {
            self.paint_segment(from, (x, y));
            self.cursor = Some((x, y));
        }
    }

    pub fn end_stroke(&mut self, x: i32, y: i32) {
        if let Some(from) = self.cursor.take() {
            self.paint_segment(from, (x, y));
        }
    }

    /// Paint a whole polyline as one stroke; a single point leaves a dot
    pub fn stroke(&mut self, points: &[[i32; 2]]) {
        let Some((&[x0, y0], rest)) = points.split_first() else {
            return;
        };
        self.begin_stroke(x0, y0);
        match rest.split_last() {
            Some((&[xn, yn], middle)) => {
                for &[x, y] in middle {
                    self.extend_stroke(x, y);
                }
                self.end_stroke(xn, yn);
            }
            None => self.end_stroke(x0, y0),
        }
    }

    pub fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = ERASE_COLOR;
        }
        self.cursor = None;
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Read-only copy of the drawn pixels for classification
    pub fn snapshot(&self) -> StrokeMask {
        let (width, height) = self.image.dimensions();
        let gray = image::GrayImage::from_fn(width, height, |x, y| {
            let drawn = self.image.get_pixel(x, y).0.iter().any(|&c| c != 0);
            image::Luma([u8::from(drawn)])
        });
        StrokeMask::from_binary(gray)
    }

    fn paint_segment(&mut self, from: (i32, i32), to: (i32, i32)) {
        let radius = (self.mode.thickness() / 2) as i32;
        let color = self.mode.color();
        let line = BresenhamLineIter::new(
            (from.0 as f32, from.1 as f32),
            (to.0 as f32, to.1 as f32),
        );
        for center in line {
            draw_filled_circle_mut(&mut self.image, center, radius, color);
        }
        draw_filled_circle_mut(&mut self.image, to, radius, color);
    }
}

/// Weighted overlay `frame * alpha + overlay * beta`, saturating per channel.
pub fn blend(frame: &RgbImage, overlay: &RgbImage, alpha: f32, beta: f32) -> Result<RgbImage> {
    if frame.dimensions() != overlay.dimensions() {
        let (fw, fh) = frame.dimensions();
        let (ow, oh) = overlay.dimensions();
        return Err(ShapeError::InvalidInput(format!(
            "cannot blend {fw}x{fh} frame with {ow}x{oh} overlay"
        )));
    }
    Ok(RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let a = frame.get_pixel(x, y).0;
        let b = overlay.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| {
            (f32::from(a[c]) * alpha + f32::from(b[c]) * beta)
                .round()
                .clamp(0.0, 255.0) as u8
        }))
    }))
}
