use geo_types::{Coord, LineString, Polygon as GeoPolygon};
use image::{GrayImage, Luma, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
    algorithms::metrics::ShapeMetrics,
    error::{Result, ShapeError},
};

/// Pixel value used for drawn pixels in a [`StrokeMask`].
pub const DRAWN: u8 = 255;

/// Binary raster of drawn strokes.
///
/// Every pixel is either drawn (`255`) or empty (`0`). Width and height are
/// always non-zero; the constructors reject anything else with
/// [`ShapeError::InvalidInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeMask {
    pixels: GrayImage,
}

impl StrokeMask {
    /// Create an empty mask.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: GrayImage::new(width, height),
        })
    }

    /// Binarise a grayscale image: pixels strictly above `threshold` are drawn.
    pub fn from_luma(image: &GrayImage, threshold: u8) -> Result<Self> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self {
            pixels: imageproc::contrast::threshold(image, threshold),
        })
    }

    /// Any pixel with a non-zero channel counts as drawn.
    pub fn from_rgb(image: &RgbImage) -> Result<Self> {
        check_dimensions(image.width(), image.height())?;
        let pixels = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let drawn = image.get_pixel(x, y).0.iter().any(|&c| c != 0);
            Luma([if drawn { DRAWN } else { 0 }])
        });
        Ok(Self { pixels })
    }

    /// Build a mask from a row-major byte buffer, one byte per pixel.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(ShapeError::InvalidInput(format!(
                "mask buffer holds {} bytes, {width}x{height} needs {expected}",
                data.len()
            )));
        }
        let binary = data
            .into_iter()
            .map(|v| if v != 0 { DRAWN } else { 0 })
            .collect();
        let pixels = GrayImage::from_raw(width, height, binary).ok_or_else(|| {
            ShapeError::InvalidInput(format!("cannot build {width}x{height} mask"))
        })?;
        Ok(Self { pixels })
    }

    /// Wrap an image whose pixels are already 0 or non-zero.
    /// Callers guarantee the dimensions are non-zero.
    pub(crate) fn from_binary(image: GrayImage) -> Self {
        let mut pixels = image;
        for p in pixels.pixels_mut() {
            if p[0] != 0 {
                p[0] = DRAWN;
            }
        }
        Self { pixels }
    }

    /// Copy of the pixels surrounded by an empty border `margin` pixels wide.
    ///
    /// Border following and morphology treat the image edge differently from
    /// empty pixels; padding makes regions touching the edge behave like any other.
    pub(crate) fn padded(&self, margin: u32) -> GrayImage {
        let (width, height) = self.dimensions();
        let mut out = GrayImage::new(width + 2 * margin, height + 2 * margin);
        image::imageops::replace(&mut out, &self.pixels, i64::from(margin), i64::from(margin));
        out
    }

    /// Inverse of [`padded`](Self::padded): crop the margin back off.
    pub(crate) fn unpadded(image: &GrayImage, margin: u32, width: u32, height: u32) -> Self {
        let cropped = image::imageops::crop_imm(image, margin, margin, width, height).to_image();
        Self::from_binary(cropped)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Out-of-bounds coordinates read as not drawn.
    pub fn is_drawn(&self, x: u32, y: u32) -> bool {
        self.pixels
            .get_pixel_checked(x, y)
            .is_some_and(|p| p[0] != 0)
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, drawn: bool) {
        if let Some(p) = self.pixels.get_pixel_mut_checked(x, y) {
            p[0] = if drawn { DRAWN } else { 0 };
        }
    }

    pub fn drawn_count(&self) -> usize {
        self.pixels.pixels().filter(|p| p[0] != 0).count()
    }

    /// True when no pixel is drawn.
    pub fn is_empty(&self) -> bool {
        self.pixels.pixels().all(|p| p[0] == 0)
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ShapeError::InvalidInput(format!(
            "mask dimensions must be non-zero, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Closed boundary of one connected drawn region, in tracing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[i32; 2]>,
}

impl Contour {
    /// A trailing point equal to the first one is dropped; closure is implicit.
    pub fn new(mut points: Vec<[i32; 2]>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the closed boundary, including the segment back to the start.
    pub fn perimeter(&self) -> f64 {
        closed_length(&self.points)
    }

    /// Enclosed area of the boundary (shoelace, unsigned).
    pub fn area(&self) -> f64 {
        use geo::Area;
        to_geo_polygon(&self.points).unsigned_area()
    }
}

/// Simplified closed polygon; its vertices are a subset of one contour's points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<[i32; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[i32; 2]>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Fewer than three vertices cannot enclose anything.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    pub fn perimeter(&self) -> f64 {
        closed_length(&self.vertices)
    }

    /// Convert to geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        to_geo_polygon(&self.vertices)
    }
}

fn to_geo_polygon(points: &[[i32; 2]]) -> GeoPolygon<f64> {
    let exterior: LineString<f64> = points
        .iter()
        .map(|&[x, y]| Coord {
            x: f64::from(x),
            y: f64::from(y),
        })
        .collect();
    GeoPolygon::new(exterior, vec![])
}

fn closed_length(points: &[[i32; 2]]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| {
            let dx = f64::from(b[0] - a[0]);
            let dy = f64::from(b[1] - a[1]);
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Axis-aligned pixel extent: `width = max_x - min_x + 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Empty input gives the zero box.
    pub fn from_points(points: &[[i32; 2]]) -> Self {
        let Some(&[first_x, first_y]) = points.first() else {
            return Self::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first_x, first_y, first_x, first_y);
        for &[x, y] in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x) as u32 + 1,
            height: (max_y - min_y) as u32 + 1,
        }
    }

    /// `width / height`, or 0 for the zero box.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn center(&self) -> [f64; 2] {
        [
            f64::from(self.x) + (f64::from(self.width) - 1.0) / 2.0,
            f64::from(self.y) + (f64::from(self.height) - 1.0) / 2.0,
        ]
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// The closed set of shapes the classifier can report.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter,
    PartialEq, Eq, Hash,
)]
pub enum ShapeLabel {
    Triangle,
    Square,
    Rectangle,
    Circle,
    Arrow,
    Unknown,
}

/// Classification of one contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeResult {
    pub label: ShapeLabel,
    /// Polygon centroid, not the bounding-box centre
    pub centroid: [f64; 2],
    pub vertex_count: usize,
    pub bounding_box: BoundingBox,
    pub metrics: ShapeMetrics,
    pub polygon: Polygon,
}

impl ShapeResult {
    pub fn new(label: ShapeLabel, polygon: Polygon, metrics: ShapeMetrics) -> Self {
        Self {
            label,
            centroid: metrics.centroid,
            vertex_count: polygon.len(),
            bounding_box: metrics.bounding_box,
            metrics,
            polygon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// One entry per surviving contour, in extraction order
    pub shapes: Vec<ShapeResult>,
    /// Original mask dimensions
    pub image_width: u32,
    pub image_height: u32,
}

impl ClassificationReport {
    pub fn empty(image_width: u32, image_height: u32) -> Self {
        Self {
            shapes: Vec::new(),
            image_width,
            image_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn labels(&self) -> Vec<ShapeLabel> {
        self.shapes.iter().map(|s| s.label).collect()
    }

    pub fn count(&self, label: ShapeLabel) -> usize {
        self.shapes.iter().filter(|s| s.label == label).count()
    }

    /// The shape enclosing the largest area.
    pub fn largest(&self) -> Option<&ShapeResult> {
        self.shapes
            .iter()
            .max_by(|a, b| a.metrics.area.total_cmp(&b.metrics.area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(StrokeMask::new(0, 10), Err(ShapeError::InvalidInput(_))));
        assert!(matches!(StrokeMask::new(10, 0), Err(ShapeError::InvalidInput(_))));
        assert!(StrokeMask::from_luma(&GrayImage::new(0, 0), 0).is_err());
    }

    #[test]
    fn test_raw_buffer_length_checked() {
        assert!(StrokeMask::from_raw(4, 4, vec![0; 15]).is_err());

        let mask = StrokeMask::from_raw(2, 2, vec![0, 7, 0, 1]).expect("valid buffer");
        assert!(mask.is_drawn(1, 0));
        assert!(mask.is_drawn(1, 1));
        assert!(!mask.is_drawn(0, 0));
        assert_eq!(mask.drawn_count(), 2);
        assert_eq!(mask.as_gray().get_pixel(1, 0)[0], DRAWN);
    }

    #[test]
    fn test_mask_from_rgb() {
        let mut canvas = RgbImage::new(3, 3);
        canvas.put_pixel(1, 1, image::Rgb([200, 0, 0]));
        let mask = StrokeMask::from_rgb(&canvas).unwrap();
        assert_eq!(mask.drawn_count(), 1);
        assert!(mask.is_drawn(1, 1));
        assert!(!mask.is_drawn(5, 5));
    }

    #[test]
    fn test_luma_threshold() {
        let mut img = GrayImage::new(4, 1);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([200]));
        let mask = StrokeMask::from_luma(&img, 128).unwrap();
        assert!(!mask.is_drawn(0, 0));
        assert!(mask.is_drawn(1, 0));
        assert!(!StrokeMask::new(4, 1).unwrap().is_drawn(1, 0));
    }

    #[test]
    fn test_contour_drops_closing_point() {
        let contour = Contour::new(vec![[0, 0], [10, 0], [10, 10], [0, 0]]);
        assert_eq!(contour.len(), 3);
        assert!((contour.area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_perimeter_is_closed() {
        let square = Polygon::new(vec![[0, 0], [10, 0], [10, 10], [0, 10]]);
        assert!((square.perimeter() - 40.0).abs() < 1e-9);
        assert!(!square.is_degenerate());
        assert!(Polygon::new(vec![[0, 0], [5, 5]]).is_degenerate());
    }

    #[test]
    fn test_bounding_box_is_inclusive() {
        let bbox = BoundingBox::from_points(&[[10, 20], [209, 20], [209, 99], [10, 99]]);
        assert_eq!(bbox, BoundingBox { x: 10, y: 20, width: 200, height: 80 });
        assert!((bbox.aspect_ratio() - 2.5).abs() < 1e-9);
        assert_eq!(BoundingBox::from_points(&[]).aspect_ratio(), 0.0);
    }

    #[test]
    fn test_label_names() {
        assert_eq!(ShapeLabel::Rectangle.to_string(), "Rectangle");
        assert_eq!("Arrow".parse::<ShapeLabel>().unwrap(), ShapeLabel::Arrow);
    }
}
