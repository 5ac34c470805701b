use imageproc::distance_transform::Norm;
use crate::{error::Result, traits::MaskPreprocessor, types::StrokeMask};

/// Morphological closing: bridges gaps narrower than `2 * radius` in a stroke
#[derive(Debug, Clone)]
pub struct MorphologicalClose {
    pub radius: u8,
}

impl Default for MorphologicalClose {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl MaskPreprocessor for MorphologicalClose {
    fn preprocess(&self, mask: &StrokeMask) -> Result<StrokeMask> {
        if self.radius == 0 {
            return Ok(mask.clone());
        }
        let margin = u32::from(self.radius) + 1;
        let closed = imageproc::morphology::close(&mask.padded(margin), Norm::LInf, self.radius);
        Ok(StrokeMask::unpadded(&closed, margin, mask.width(), mask.height()))
    }
}

/// Morphological opening: removes specks smaller than the structuring square
#[derive(Debug, Clone)]
pub struct MorphologicalOpen {
    pub radius: u8,
}

impl Default for MorphologicalOpen {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl MaskPreprocessor for MorphologicalOpen {
    fn preprocess(&self, mask: &StrokeMask) -> Result<StrokeMask> {
        if self.radius == 0 {
            return Ok(mask.clone());
        }
        let margin = u32::from(self.radius) + 1;
        let opened = imageproc::morphology::open(&mask.padded(margin), Norm::LInf, self.radius);
        Ok(StrokeMask::unpadded(&opened, margin, mask.width(), mask.height()))
    }
}
