use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::{
    algorithms::metrics::{concavities, ShapeMetrics},
    traits::ShapeClassifier,
    types::{Polygon, ShapeLabel},
};

/// Vertex-count driven classifier with geometric tie-breakers.
///
/// Rules are checked in order and the first match wins:
///
/// 1. 3 vertices: triangle
/// 2. 4 vertices, convex: square or rectangle when every corner is close to 90°,
///    unknown otherwise
/// 3. many vertices and high circularity: circle
/// 4. the arrow vertex count, or a concave elongated silhouette with a single
///    significant pocket: arrow
/// 5. anything else: unknown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RuleClassifier {
    /// Allowed deviation from 90° at each quadrilateral corner, in degrees
    #[schemars(range(min = 0.0, max = 45.0))]
    pub right_angle_tolerance: f64,
    /// A right-angled quadrilateral is a square when `|aspect - 1|` is below this
    #[schemars(range(min = 0.0, max = 1.0))]
    pub square_tolerance: f64,
    pub circle_min_vertices: usize,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub circle_min_circularity: f64,
    /// Vertex count of a simplified head-and-shaft arrow
    pub arrow_vertex_count: usize,
    /// Bounding box aspect (or its inverse) an arrow must exceed
    #[schemars(range(min = 1.0))]
    pub arrow_min_elongation: f64,
    /// Minimum pocket depth as a fraction of the longer bounding box side
    #[schemars(range(min = 0.0, max = 1.0))]
    pub arrow_concavity_depth: f64,
    /// Largest number of significant pockets an arrow may have
    #[schemars(range(min = 1))]
    pub arrow_max_concavities: usize,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self {
            right_angle_tolerance: 10.0,
            square_tolerance: 0.1,
            circle_min_vertices: 8,
            circle_min_circularity: 0.8,
            arrow_vertex_count: 7,
            arrow_min_elongation: 2.0,
            arrow_concavity_depth: 0.1,
            arrow_max_concavities: 1,
        }
    }
}

impl ShapeClassifier for RuleClassifier {
    fn classify(&self, polygon: &Polygon, metrics: &ShapeMetrics) -> ShapeLabel {
        match polygon.len() {
            n if n < 3 => ShapeLabel::Unknown,
            3 => ShapeLabel::Triangle,
            4 if metrics.convex => self.classify_quadrilateral(metrics),
            n if n >= self.circle_min_vertices
                && metrics.circularity >= self.circle_min_circularity =>
            {
                ShapeLabel::Circle
            }
            n if n == self.arrow_vertex_count => ShapeLabel::Arrow,
            _ if self.is_arrow_silhouette(polygon, metrics) => ShapeLabel::Arrow,
            _ => ShapeLabel::Unknown,
        }
    }
}

impl RuleClassifier {
    fn classify_quadrilateral(&self, metrics: &ShapeMetrics) -> ShapeLabel {
        let right_angled = metrics
            .interior_angles
            .iter()
            .all(|angle| (angle - 90.0).abs() <= self.right_angle_tolerance);
        if !right_angled {
            return ShapeLabel::Unknown;
        }
        if (metrics.aspect_ratio - 1.0).abs() < self.square_tolerance {
            ShapeLabel::Square
        } else {
            ShapeLabel::Rectangle
        }
    }

    fn is_arrow_silhouette(&self, polygon: &Polygon, metrics: &ShapeMetrics) -> bool {
        if metrics.convex || !metrics.is_elongated(self.arrow_min_elongation) {
            return false;
        }
        let min_depth =
            self.arrow_concavity_depth * f64::from(metrics.bounding_box.longest_side());
        let significant = concavities(polygon)
            .iter()
            .filter(|pocket| pocket.depth >= min_depth)
            .count();
        (1..=self.arrow_max_concavities).contains(&significant)
    }
}
