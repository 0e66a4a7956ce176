//! Pixel to millimeter conversion
//!
//! Every section is rasterized at the same scale, so one reference image of
//! known physical width (the page width) fixes the ratio for all of them.

use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    pixels_per_mm: f32,
}

impl UnitConverter {
    /// Derive the ratio from a reference image spanning `page_width_mm`
    pub fn from_reference(reference_width_px: u32, page_width_mm: f32) -> Result<Self, LayoutError> {
        if reference_width_px == 0 {
            return Err(LayoutError::NoReferenceSection);
        }
        if page_width_mm <= 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "page width must be positive, got {}mm",
                page_width_mm
            )));
        }
        Ok(Self {
            pixels_per_mm: reference_width_px as f32 / page_width_mm,
        })
    }

    pub fn pixels_per_mm(&self) -> f32 {
        self.pixels_per_mm
    }

    pub fn px_to_mm(&self, px: f32) -> f32 {
        px / self.pixels_per_mm
    }

    pub fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.pixels_per_mm
    }
}
