use crate::{
    algorithms::metrics::ShapeMetrics,
    error::Result,
    types::{Contour, Polygon, ShapeLabel, StrokeMask},
};

/// Trait for mask cleanup steps run before contour extraction
pub trait MaskPreprocessor: Send + Sync {
    /// Produce a cleaned copy of the mask
    fn preprocess(&self, mask: &StrokeMask) -> Result<StrokeMask>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract the outer boundary of every drawn region worth classifying
    fn extract_contours(&self, mask: &StrokeMask) -> Result<Vec<Contour>>;
}

/// Trait for polygon simplification algorithms
pub trait PolygonSimplifier: Send + Sync {
    /// Reduce a dense contour to a small set of vertices
    fn simplify(&self, contour: &Contour) -> Polygon;
}

/// Trait for shape classification rules
pub trait ShapeClassifier: Send + Sync {
    /// Label a simplified polygon. Must be total: anything unrecognised is `Unknown`.
    fn classify(&self, polygon: &Polygon, metrics: &ShapeMetrics) -> ShapeLabel;
}
