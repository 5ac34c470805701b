//! # Sketch Shape Detection Library
//!
//! Classifies hand-drawn closed shapes in a binary stroke mask as triangles,
//! squares, rectangles, circles or arrows.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: every stage (cleanup, contour extraction,
//!   simplification, classification) is a swappable trait object
//! - **Scale invariance**: simplification tolerance is a fraction of each contour's perimeter
//! - **Total classification**: anything unrecognised is reported as `Unknown`, never as an error
//! - **Annotation**: label overlay with a built-in bitmap font
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shapes::{Pipeline, StrokeMask};
//!
//! let image = image::open("strokes.png")?.to_luma8();
//! let mask = StrokeMask::from_luma(&image, 0)?;
//!
//! let report = Pipeline::default().process(&mask)?;
//! for shape in &report.shapes {
//!     println!("{} at {:?}", shape.label, shape.centroid);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust
//! use shapes::{Pipeline, RuleClassifier};
//!
//! let pipeline = Pipeline::builder()
//!     .with_closing(2)
//!     .with_min_area(100.0)
//!     .with_epsilon_ratio(0.03)
//!     .set_classifier(RuleClassifier { right_angle_tolerance: 15.0, ..Default::default() })
//!     .build();
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod config;
pub mod annotate;
pub mod canvas;

// Re-exports for convenience
pub use error::{Result, ShapeError};
pub use types::{
    BoundingBox, ClassificationReport, Contour, Polygon, ShapeLabel, ShapeResult, StrokeMask,
};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use config::DetectorConfig;
pub use annotate::Annotator;
pub use canvas::{blend, StrokeCanvas, StrokeMode};

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    /// Fill every pixel whose centre lies inside `vertices` (even-odd rule)
    fn fill_polygon(mask: &mut StrokeMask, vertices: &[(f64, f64)]) {
        let (width, height) = mask.dimensions();
        for y in 0..height {
            for x in 0..width {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let mut inside = false;
                let mut j = vertices.len() - 1;
                for i in 0..vertices.len() {
                    let (xi, yi) = vertices[i];
                    let (xj, yj) = vertices[j];
                    if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                        inside = !inside;
                    }
                    j = i;
                }
                if inside {
                    mask.set(x, y, true);
                }
            }
        }
    }

    fn fill_rect(mask: &mut StrokeMask, x: f64, y: f64, w: f64, h: f64) {
        fill_polygon(mask, &[(x, y), (x + w, y), (x + w, y + h), (x, y + h)]);
    }

    fn fill_disc(mask: &mut StrokeMask, cx: f64, cy: f64, r: f64) {
        let (width, height) = mask.dimensions();
        for y in 0..height {
            for x in 0..width {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    mask.set(x, y, true);
                }
            }
        }
    }

    fn scaled(vertices: &[(f64, f64)], k: f64) -> Vec<(f64, f64)> {
        vertices.iter().map(|&(x, y)| (x * k, y * k)).collect()
    }

    const TRIANGLE: [(f64, f64); 3] = [(150.0, 40.0), (210.0, 144.0), (90.0, 144.0)];
    const ARROW: [(f64, f64); 7] = [
        (20.0, 90.0), (140.0, 90.0), (140.0, 60.0), (200.0, 100.0),
        (140.0, 140.0), (140.0, 110.0), (20.0, 110.0),
    ];

    fn classify_single(mask: &StrokeMask) -> ShapeResult {
        let report = Pipeline::default().process(mask).expect("Should process successfully");
        assert_eq!(report.shapes.len(), 1, "expected exactly one shape, got {:?}", report.labels());
        report.shapes.into_iter().next().unwrap()
    }

    #[test]
    fn test_square_scenario() {
        let mut mask = StrokeMask::new(250, 250).unwrap();
        fill_rect(&mut mask, 50.0, 50.0, 100.0, 100.0);

        let shape = classify_single(&mask);
        assert_eq!(shape.vertex_count, 4);
        assert_eq!(shape.label, ShapeLabel::Square);
        assert_eq!(shape.bounding_box, BoundingBox { x: 50, y: 50, width: 100, height: 100 });
        assert!((shape.centroid[0] - 99.5).abs() < 1.0);
        assert!((shape.centroid[1] - 99.5).abs() < 1.0);
    }

    #[test]
    fn test_shapes_touching_the_frame_edge() {
        let mut mask = StrokeMask::new(250, 250).unwrap();
        fill_rect(&mut mask, 0.0, 0.0, 100.0, 100.0);
        let shape = classify_single(&mask);
        assert_eq!(shape.label, ShapeLabel::Square);
        assert_eq!(shape.bounding_box, BoundingBox { x: 0, y: 0, width: 100, height: 100 });

        let mut mask = StrokeMask::new(250, 250).unwrap();
        fill_rect(&mut mask, 0.0, 30.0, 40.0, 40.0);
        assert_eq!(Pipeline::default().process(&mask).unwrap().labels(), vec![ShapeLabel::Square]);

        let mut mask = StrokeMask::new(100, 100).unwrap();
        fill_rect(&mut mask, 0.0, 0.0, 100.0, 100.0);
        assert_eq!(Pipeline::default().process(&mask).unwrap().labels(), vec![ShapeLabel::Square]);
    }

    #[test]
    fn test_rectangle_scenario() {
        let mut mask = StrokeMask::new(300, 200).unwrap();
        fill_rect(&mut mask, 40.0, 60.0, 200.0, 80.0);

        let shape = classify_single(&mask);
        assert_eq!(shape.label, ShapeLabel::Rectangle);
        assert_eq!(shape.vertex_count, 4);
        assert!((shape.metrics.aspect_ratio - 2.5).abs() < 0.05);
    }

    #[test]
    fn test_triangle_scenario() {
        let mut mask = StrokeMask::new(300, 200).unwrap();
        fill_polygon(&mut mask, &TRIANGLE);

        let shape = classify_single(&mask);
        assert_eq!(shape.vertex_count, 3);
        assert_eq!(shape.label, ShapeLabel::Triangle);
    }

    #[test]
    fn test_circle_scenario() {
        let mut mask = StrokeMask::new(300, 200).unwrap();
        fill_disc(&mut mask, 150.0, 100.0, 50.0);

        let shape = classify_single(&mask);
        assert_eq!(shape.label, ShapeLabel::Circle);
        assert!(shape.metrics.circularity >= 0.8);
        assert!((shape.centroid[0] - 150.0).abs() < 2.0);
        assert!((shape.centroid[1] - 100.0).abs() < 2.0);
    }

    #[test]
    fn test_arrow_scenario() {
        let mut mask = StrokeMask::new(240, 180).unwrap();
        fill_polygon(&mut mask, &ARROW);

        let shape = classify_single(&mask);
        assert_eq!(shape.vertex_count, 7);
        assert_eq!(shape.label, ShapeLabel::Arrow);
    }

    #[test]
    fn test_parallelogram_is_unknown() {
        let mut mask = StrokeMask::new(260, 180).unwrap();
        fill_polygon(&mut mask, &[(40.0, 40.0), (160.0, 40.0), (200.0, 120.0), (80.0, 120.0)]);

        let shape = classify_single(&mask);
        assert_eq!(shape.vertex_count, 4);
        assert_eq!(shape.label, ShapeLabel::Unknown);
    }

    #[test]
    fn test_thin_stroke_is_degenerate() {
        let mut mask = StrokeMask::new(260, 60).unwrap();
        fill_rect(&mut mask, 20.0, 20.0, 200.0, 4.0);

        let shape = classify_single(&mask);
        assert!(shape.vertex_count < 3);
        assert_eq!(shape.label, ShapeLabel::Unknown);
    }

    #[test]
    fn test_empty_mask_scenario() {
        let mask = StrokeMask::new(640, 480).unwrap();
        let report = Pipeline::default().process(&mask).unwrap();
        assert!(report.is_empty());
        assert_eq!((report.image_width, report.image_height), (640, 480));
    }

    #[test]
    fn test_noise_scenario() {
        let mut mask = StrokeMask::new(100, 100).unwrap();
        mask.set(40, 60, true);
        let report = Pipeline::default().process(&mask).unwrap();
        assert_eq!(report.shapes.len(), 0);
    }

    #[test]
    fn test_one_result_per_region() {
        let mut mask = StrokeMask::new(600, 250).unwrap();
        fill_rect(&mut mask, 320.0, 50.0, 100.0, 100.0);
        fill_polygon(&mut mask, &TRIANGLE);
        fill_disc(&mut mask, 500.0, 150.0, 50.0);
        mask.set(5, 240, true);

        let report = Pipeline::default().process(&mask).unwrap();
        assert_eq!(report.shapes.len(), 3);
        assert_eq!(report.count(ShapeLabel::Square), 1);
        assert_eq!(report.count(ShapeLabel::Triangle), 1);
        assert_eq!(report.count(ShapeLabel::Circle), 1);
        for shape in &report.shapes {
            assert_eq!(shape.vertex_count, shape.polygon.len());
        }
        assert_eq!(report.largest().map(|s| s.label), Some(ShapeLabel::Square));
    }

    #[test]
    fn test_scale_invariance() {
        let pipeline = Pipeline::default();
        let shapes: [(&[(f64, f64)], ShapeLabel); 3] = [
            (&TRIANGLE, ShapeLabel::Triangle),
            (&ARROW, ShapeLabel::Arrow),
            (&[(20.0, 20.0), (120.0, 20.0), (120.0, 60.0), (20.0, 60.0)], ShapeLabel::Rectangle),
        ];
        for (vertices, expected) in shapes {
            for k in [1.0, 2.0] {
                let mut mask = StrokeMask::new((240.0 * k) as u32, (180.0 * k) as u32).unwrap();
                fill_polygon(&mut mask, &scaled(vertices, k));
                let report = pipeline.process(&mask).unwrap();
                assert_eq!(report.labels(), vec![expected], "scale {k}");
            }
        }

        for r in [40.0, 80.0] {
            let mut mask = StrokeMask::new(200, 200).unwrap();
            fill_disc(&mut mask, 100.0, 100.0, r);
            assert_eq!(pipeline.process(&mask).unwrap().labels(), vec![ShapeLabel::Circle]);
        }
    }

    #[test]
    fn test_rotation_robustness() {
        let pipeline = Pipeline::default();
        for (cx, cy) in [(150.3, 100.7), (149.6, 99.2), (151.5, 100.5)] {
            let mut mask = StrokeMask::new(300, 200).unwrap();
            fill_disc(&mut mask, cx, cy, 50.0);
            assert_eq!(pipeline.process(&mask).unwrap().labels(), vec![ShapeLabel::Circle]);
        }

        // Square turned by 45 degrees
        let mut mask = StrokeMask::new(300, 200).unwrap();
        fill_polygon(&mut mask, &[(150.0, 40.0), (210.0, 100.0), (150.0, 160.0), (90.0, 100.0)]);
        let shape = classify_single(&mask);
        assert_eq!(shape.label, ShapeLabel::Square);
    }

    #[test]
    fn test_idempotence() {
        let mut mask = StrokeMask::new(600, 250).unwrap();
        fill_rect(&mut mask, 320.0, 50.0, 100.0, 100.0);
        fill_polygon(&mut mask, &TRIANGLE);

        let pipeline = Pipeline::default();
        let first = pipeline.process(&mask).unwrap();
        let second = pipeline.process(&mask).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_drawn_outline_scenario() {
        let mut canvas = StrokeCanvas::new(220, 220).unwrap();
        canvas.stroke(&[[60, 60], [160, 60], [160, 160], [60, 160], [60, 60]]);

        let shape = classify_single(&canvas.snapshot());
        assert_eq!(shape.vertex_count, 4);
        assert_eq!(shape.label, ShapeLabel::Square);
    }

    #[test]
    fn test_invalid_input() {
        let pipeline = Pipeline::default();
        let result = pipeline.process_image(&GrayImage::new(0, 10));
        assert!(matches!(result, Err(ShapeError::InvalidInput(_))));
    }

    #[test]
    fn test_grayscale_threshold() {
        let mut image = GrayImage::new(200, 200);
        for y in 50..150 {
            for x in 50..150 {
                image.put_pixel(x, y, image::Luma([90u8]));
            }
        }

        let dim = Pipeline::builder().with_threshold(100).build();
        assert!(dim.process_image(&image).unwrap().is_empty());

        let bright = Pipeline::builder().with_threshold(50).build();
        assert_eq!(bright.process_image(&image).unwrap().labels(), vec![ShapeLabel::Square]);
    }

    #[test]
    fn test_pipeline_from_config() {
        let config = DetectorConfig {
            min_contour_area: 20_000.0,
            ..Default::default()
        };
        let pipeline = PipelineBuilder::from_config(&config).build();
        assert!(pipeline.info().contains("1 preprocessors"));

        let mut mask = StrokeMask::new(250, 250).unwrap();
        fill_rect(&mut mask, 50.0, 50.0, 100.0, 100.0);
        assert!(pipeline.process(&mask).unwrap().is_empty());
    }
}
