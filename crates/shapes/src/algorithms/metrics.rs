use geo::{Area, Centroid, ConvexHull, EuclideanDistance};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use crate::types::{BoundingBox, Polygon};

/// Vertices closer than this to the convex hull count as lying on it
const HULL_TOLERANCE: f64 = 0.5;

/// Geometry of a simplified polygon, computed once and shared by every rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeMetrics {
    /// Unsigned shoelace area
    pub area: f64,
    pub perimeter: f64,
    pub bounding_box: BoundingBox,
    /// Bounding box `width / height`
    pub aspect_ratio: f64,
    pub convex: bool,
    /// Interior angle at each vertex in degrees; reflex vertices exceed 180
    pub interior_angles: Vec<f64>,
    /// `4π·area / perimeter²`, 1.0 for a perfect circle
    pub circularity: f64,
    pub centroid: [f64; 2],
}

impl ShapeMetrics {
    pub fn measure(polygon: &Polygon) -> Self {
        let geo_polygon = polygon.to_geo_polygon();
        let signed_area = geo_polygon.signed_area();
        let area = signed_area.abs();
        let perimeter = polygon.perimeter();
        let bounding_box = BoundingBox::from_points(&polygon.vertices);

        // +1 when the shoelace sum is positive, -1 when negative, 0 when flat
        let orientation: i64 = if signed_area > 0.0 {
            1
        } else if signed_area < 0.0 {
            -1
        } else {
            0
        };

        let turns = turns(&polygon.vertices);
        let convex = !polygon.is_degenerate()
            && orientation != 0
            && turns.iter().all(|t| t.cross * orientation >= 0);

        let interior_angles = turns
            .iter()
            .map(|t| {
                if t.cross * orientation < 0 {
                    360.0 - t.opening
                } else {
                    t.opening
                }
            })
            .collect();

        let circularity = if perimeter > 0.0 {
            4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
        } else {
            0.0
        };

        let centroid = if area > 0.0 {
            geo_polygon
                .centroid()
                .map(|c| [c.x(), c.y()])
                .unwrap_or_else(|| bounding_box.center())
        } else {
            bounding_box.center()
        };

        Self {
            area,
            perimeter,
            bounding_box,
            aspect_ratio: bounding_box.aspect_ratio(),
            convex,
            interior_angles,
            circularity,
            centroid,
        }
    }

    /// Bounding box is at least `ratio` times longer along one axis than the other
    pub fn is_elongated(&self, ratio: f64) -> bool {
        self.aspect_ratio > ratio || (self.aspect_ratio > 0.0 && self.aspect_ratio < 1.0 / ratio)
    }
}

struct Turn {
    /// z component of `(cur - prev) × (next - cur)`
    cross: i64,
    /// Angle between the two edges meeting at the vertex, in [0, 180]
    opening: f64,
}

fn turns(vertices: &[[i32; 2]]) -> Vec<Turn> {
    let n = vertices.len();
    if n < 3 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let [px, py] = vertices[(i + n - 1) % n];
            let [cx, cy] = vertices[i];
            let [nx, ny] = vertices[(i + 1) % n];

            let (ax, ay) = (i64::from(cx - px), i64::from(cy - py));
            let (bx, by) = (i64::from(nx - cx), i64::from(ny - cy));
            let cross = ax * by - ay * bx;

            // Edges as seen from the vertex
            let (ux, uy) = (-(ax as f64), -(ay as f64));
            let (vx, vy) = (bx as f64, by as f64);
            let norms = (ux * ux + uy * uy).sqrt() * (vx * vx + vy * vy).sqrt();
            let opening = if norms > 0.0 {
                ((ux * vx + uy * vy) / norms).clamp(-1.0, 1.0).acos().to_degrees()
            } else {
                0.0
            };

            Turn { cross, opening }
        })
        .collect()
}

/// A run of consecutive vertices lying strictly inside the convex hull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Concavity {
    pub vertices: usize,
    /// Largest distance from a vertex of the run to the hull boundary
    pub depth: f64,
}

/// Pockets between the polygon and its convex hull, in vertex order.
pub fn concavities(polygon: &Polygon) -> Vec<Concavity> {
    if polygon.is_degenerate() {
        return Vec::new();
    }

    let hull = polygon.to_geo_polygon().convex_hull();
    let depths: Vec<f64> = polygon
        .vertices
        .iter()
        .map(|&[x, y]| Point::new(f64::from(x), f64::from(y)).euclidean_distance(hull.exterior()))
        .collect();

    let Some(start) = depths.iter().position(|&d| d <= HULL_TOLERANCE) else {
        return Vec::new();
    };

    let n = depths.len();
    let mut pockets = Vec::new();
    let mut current: Option<Concavity> = None;
    for offset in 1..=n {
        let depth = depths[(start + offset) % n];
        if depth > HULL_TOLERANCE {
            let pocket = current.get_or_insert(Concavity { vertices: 0, depth: 0.0 });
            pocket.vertices += 1;
            pocket.depth = pocket.depth.max(depth);
        } else if let Some(pocket) = current.take() {
            pockets.push(pocket);
        }
    }
    pockets
}
