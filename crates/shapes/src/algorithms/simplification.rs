use geo::SimplifyIdx;
use geo_types::{Coord, LineString};
use crate::{
    traits::PolygonSimplifier,
    types::{Contour, Polygon},
};

/// Douglas-Peucker simplifier with a tolerance proportional to the contour perimeter.
///
/// `epsilon = epsilon_ratio * perimeter`, so shapes with the same proportions
/// simplify to the same vertex count whatever their size.
///
/// A closed contour has no natural endpoints, so it is split at two mutually
/// distant boundary points (both are extreme points of the shape and survive
/// any tolerance) and the two chains between them are simplified separately
/// with geo's implementation.
#[derive(Debug, Clone)]
pub struct PerimeterDouglasPeucker {
    pub epsilon_ratio: f64,
}

impl Default for PerimeterDouglasPeucker {
    fn default() -> Self {
        Self { epsilon_ratio: 0.02 }
    }
}

impl PerimeterDouglasPeucker {
    pub fn epsilon(&self, contour: &Contour) -> f64 {
        self.epsilon_ratio * contour.perimeter()
    }
}

impl PolygonSimplifier for PerimeterDouglasPeucker {
    fn simplify(&self, contour: &Contour) -> Polygon {
        let points = &contour.points;
        if points.len() < 3 {
            return Polygon::new(points.clone());
        }

        let epsilon = self.epsilon(contour);
        let anchor = farthest_from(points, 0);
        let opposite = farthest_from(points, anchor);
        let (first, second) = (anchor.min(opposite), anchor.max(opposite));
        if first == second {
            // Every point coincides
            return Polygon::new(vec![points[first]]);
        }

        let forward: Vec<[i32; 2]> = points[first..=second].to_vec();
        let backward: Vec<[i32; 2]> = points[second..]
            .iter()
            .chain(points[..=first].iter())
            .copied()
            .collect();

        // Each chain ends where the other starts; drop the shared endpoints once
        let mut vertices = simplify_chain(&forward, epsilon);
        vertices.pop();
        let mut tail = simplify_chain(&backward, epsilon);
        tail.pop();
        vertices.extend(tail);

        Polygon::new(vertices)
    }
}

fn farthest_from(points: &[[i32; 2]], origin: usize) -> usize {
    let [ox, oy] = points[origin];
    let mut best = origin;
    let mut best_distance = 0i64;
    for (i, &[x, y]) in points.iter().enumerate() {
        let dx = i64::from(x - ox);
        let dy = i64::from(y - oy);
        let distance = dx * dx + dy * dy;
        if distance > best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

fn simplify_chain(chain: &[[i32; 2]], epsilon: f64) -> Vec<[i32; 2]> {
    let line: LineString<f64> = chain
        .iter()
        .map(|&[x, y]| Coord {
            x: f64::from(x),
            y: f64::from(y),
        })
        .collect();
    line.simplify_idx(&epsilon)
        .into_iter()
        .map(|i| chain[i])
        .collect()
}
