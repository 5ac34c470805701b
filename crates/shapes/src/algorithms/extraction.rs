use imageproc::contours::{find_contours, BorderType};
use tracing::debug;
use crate::{
    error::Result,
    traits::ContourExtractor,
    types::{Contour, StrokeMask},
};

/// Suzuki-Abe border following via `imageproc::contours::find_contours`.
///
/// The mask is traced inside a one pixel empty frame so that regions touching
/// the image edge are still reported as outer borders.
///
/// Only outer borders are kept: each one is the boundary of a maximal
/// 8-connected region of drawn pixels. Hole borders never become shapes.
/// Regions whose boundary encloses less than `min_area` square pixels are
/// dropped as noise.
#[derive(Debug, Clone)]
pub struct BorderFollowingExtractor {
    pub min_area: f64,
}

impl Default for BorderFollowingExtractor {
    fn default() -> Self {
        Self { min_area: 50.0 }
    }
}

impl ContourExtractor for BorderFollowingExtractor {
    fn extract_contours(&self, mask: &StrokeMask) -> Result<Vec<Contour>> {
        if mask.is_empty() {
            return Ok(Vec::new());
        }

        let contours = find_contours::<i32>(&mask.padded(1));

        let result = contours
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer))
            .map(|c| Contour::new(c.points.iter().map(|p| [p.x - 1, p.y - 1]).collect()))
            .filter(|contour| {
                let area = contour.area();
                if area < self.min_area {
                    debug!(points = contour.len(), area, "dropping contour below minimum area");
                    return false;
                }
                true
            })
            .collect();

        Ok(result)
    }
}
