use crate::{
    pipeline::Pipeline,
    config::DetectorConfig,
    traits::{ContourExtractor, MaskPreprocessor, PolygonSimplifier, ShapeClassifier},
    algorithms::{
        BorderFollowingExtractor,
        MorphologicalClose,
        MorphologicalOpen,
        PerimeterDouglasPeucker,
        RuleClassifier,
    },
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    threshold: u8,
    preprocessors: Vec<Box<dyn MaskPreprocessor>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<Box<dyn PolygonSimplifier>>,
    classifier: Option<Box<dyn ShapeClassifier>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            threshold: 0,
            preprocessors: Vec::new(),
            contour_extractor: None,
            simplifier: None,
            classifier: None,
        }
    }

    /// Start from a loaded config: cleanup steps, area filter, tolerance and rules
    pub fn from_config(config: &DetectorConfig) -> Self {
        let mut builder = Self::new()
            .with_threshold(config.threshold)
            .set_contour_extractor(BorderFollowingExtractor { min_area: config.min_contour_area })
            .set_simplifier(PerimeterDouglasPeucker { epsilon_ratio: config.epsilon_ratio })
            .set_classifier(config.classifier.clone());
        if config.close_radius > 0 {
            builder = builder.with_closing(config.close_radius);
        }
        if config.open_radius > 0 {
            builder = builder.with_opening(config.open_radius);
        }
        builder
    }

    /// Threshold used when binarising grayscale input
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Add a preprocessor to the pipeline
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: MaskPreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    /// Add a morphological closing step
    pub fn with_closing(self, radius: u8) -> Self {
        self.add_preprocessor(MorphologicalClose { radius })
    }

    /// Add a morphological opening step
    pub fn with_opening(self, radius: u8) -> Self {
        self.add_preprocessor(MorphologicalOpen { radius })
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the polygon simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PolygonSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Set the shape classifier (replaces any existing one)
    pub fn set_classifier<C>(mut self, classifier: C) -> Self
    where
        C: ShapeClassifier + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Drop contours enclosing less than `min_area` square pixels
    pub fn with_min_area(self, min_area: f64) -> Self {
        self.set_contour_extractor(BorderFollowingExtractor { min_area })
    }

    /// Simplification tolerance as a fraction of each contour's perimeter
    pub fn with_epsilon_ratio(self, epsilon_ratio: f64) -> Self {
        self.set_simplifier(PerimeterDouglasPeucker { epsilon_ratio })
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let contour_extractor = self.contour_extractor
            .unwrap_or_else(|| Box::new(BorderFollowingExtractor::default()));

        let simplifier = self.simplifier
            .unwrap_or_else(|| Box::new(PerimeterDouglasPeucker::default()));

        let classifier = self.classifier
            .unwrap_or_else(|| Box::new(RuleClassifier::default()));

        Pipeline::new(
            self.threshold,
            self.preprocessors,
            contour_extractor,
            simplifier,
            classifier,
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
