pub mod builder;

use image::GrayImage;
use tracing::{debug, info};
use crate::{
    algorithms::metrics::ShapeMetrics,
    error::Result,
    traits::{ContourExtractor, MaskPreprocessor, PolygonSimplifier, ShapeClassifier},
    types::{ClassificationReport, Contour, ShapeResult, StrokeMask},
};

/// Mask cleanup, contour extraction, simplification and classification in one pass.
///
/// A pass only reads its input mask and keeps no state between calls, so the
/// same snapshot always produces the same report.
pub struct Pipeline {
    threshold: u8,
    preprocessors: Vec<Box<dyn MaskPreprocessor>>,
    contour_extractor: Box<dyn ContourExtractor>,
    simplifier: Box<dyn PolygonSimplifier>,
    classifier: Box<dyn ShapeClassifier>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        threshold: u8,
        preprocessors: Vec<Box<dyn MaskPreprocessor>>,
        contour_extractor: Box<dyn ContourExtractor>,
        simplifier: Box<dyn PolygonSimplifier>,
        classifier: Box<dyn ShapeClassifier>,
    ) -> Self {
        Self {
            threshold,
            preprocessors,
            contour_extractor,
            simplifier,
            classifier,
        }
    }

    /// Classify every drawn region of the mask
    pub fn process(&self, mask: &StrokeMask) -> Result<ClassificationReport> {
        let (width, height) = mask.dimensions();
        if mask.is_empty() {
            debug!(width, height, "empty mask, nothing to classify");
            return Ok(ClassificationReport::empty(width, height));
        }

        // Step 1: Clean up the mask
        let mut cleaned = mask.clone();
        for preprocessor in &self.preprocessors {
            cleaned = preprocessor.preprocess(&cleaned)?;
        }

        // Step 2: Trace region boundaries
        let contours = self.contour_extractor.extract_contours(&cleaned)?;

        // Step 3: Simplify and classify each boundary
        let shapes: Vec<ShapeResult> = contours
            .iter()
            .map(|contour| self.classify_contour(contour))
            .collect();

        info!(shapes = shapes.len(), width, height, "classified stroke mask");

        Ok(ClassificationReport {
            shapes,
            image_width: width,
            image_height: height,
        })
    }

    /// Binarise a grayscale image with the pipeline threshold, then classify it
    pub fn process_image(&self, image: &GrayImage) -> Result<ClassificationReport> {
        let mask = StrokeMask::from_luma(image, self.threshold)?;
        self.process(&mask)
    }

    /// Simplify and classify a single contour
    pub fn classify_contour(&self, contour: &Contour) -> ShapeResult {
        let polygon = self.simplifier.simplify(contour);
        let metrics = ShapeMetrics::measure(&polygon);
        let label = self.classifier.classify(&polygon, &metrics);
        debug!(
            contour_points = contour.len(),
            vertices = polygon.len(),
            circularity = metrics.circularity,
            aspect_ratio = metrics.aspect_ratio,
            %label,
            "classified contour"
        );
        ShapeResult::new(label, polygon, metrics)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: threshold {}, {} preprocessors, 1 contour extractor, 1 simplifier, 1 classifier",
            self.threshold,
            self.preprocessors.len()
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        builder::PipelineBuilder::from_config(&crate::config::DetectorConfig::default()).build()
    }
}
