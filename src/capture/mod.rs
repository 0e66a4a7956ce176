//! Section capture
//!
//! A [`Rasterizer`] turns a named region of the document into an image.
//! Sections are captured one at a time in document order; a region that is
//! missing or fails to capture is left out of the layout.

pub mod directory;
pub mod memory;
pub mod units;

use image::DynamicImage;
use std::collections::HashMap;

use crate::error::{CaptureError, LayoutError};
use crate::model::{Section, SectionKind};

pub use directory::DirectoryRasterizer;
pub use memory::MemoryRasterizer;
pub use units::UnitConverter;

/// Produces raster images for document regions
pub trait Rasterizer {
    /// Capture a region; `Ok(None)` when the region does not exist
    fn capture(&self, region_id: &str) -> Result<Option<DynamicImage>, CaptureError>;

    /// Cut the pixel rows `start_px..start_px + height_px` out of `image`
    fn crop(
        &self,
        image: &DynamicImage,
        start_px: u32,
        height_px: u32,
    ) -> Result<DynamicImage, CaptureError> {
        crop_rows(image, start_px, height_px)
    }
}

/// Crop a horizontal band of rows, keeping the full width
pub fn crop_rows(
    image: &DynamicImage,
    start_px: u32,
    height_px: u32,
) -> Result<DynamicImage, CaptureError> {
    let end = start_px.saturating_add(height_px);
    if height_px == 0 || end > image.height() {
        return Err(CaptureError::InvalidCrop {
            start: start_px,
            end,
            height: image.height(),
        });
    }
    Ok(image.crop_imm(0, start_px, image.width(), height_px))
}

/// A captured region before unit conversion
#[derive(Debug, Clone)]
pub struct Capture {
    pub kind: SectionKind,
    pub image: DynamicImage,
}

impl Capture {
    pub fn width_px(&self) -> u32 {
        self.image.width()
    }

    pub fn height_px(&self) -> u32 {
        self.image.height()
    }
}

/// Capture `kinds` in order, skipping regions that are absent or fail
pub fn capture_sections<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    kinds: &[SectionKind],
) -> Vec<Capture> {
    let mut captures = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let region = kind.region_id();
        match rasterizer.capture(&region) {
            Ok(Some(image)) => {
                log::debug!("Captured {} ({}x{}px)", kind, image.width(), image.height());
                captures.push(Capture { kind, image });
            }
            Ok(None) => log::debug!("Region {} not present, skipping", region),
            Err(e) => log::warn!("Capture of {} failed, skipping: {}", region, e),
        }
    }
    captures
}

/// Captured sections with their heights converted to millimeters
pub struct SectionSet {
    sections: Vec<Section>,
    images: HashMap<SectionKind, DynamicImage>,
    converter: UnitConverter,
}

impl SectionSet {
    /// Measure captures against the first one, taken to span `page_width_mm`
    pub fn measure(captures: Vec<Capture>, page_width_mm: f32) -> Result<Self, LayoutError> {
        let reference = captures.first().ok_or(LayoutError::NoReferenceSection)?;
        let converter = UnitConverter::from_reference(reference.width_px(), page_width_mm)?;
        log::info!(
            "Reference section {} gives {:.3} px/mm",
            reference.kind,
            converter.pixels_per_mm()
        );

        let mut sections = Vec::with_capacity(captures.len());
        let mut images = HashMap::with_capacity(captures.len());
        for capture in captures {
            let height_mm = converter.px_to_mm(capture.height_px() as f32);
            sections.push(Section::new(capture.kind, height_mm));
            images.insert(capture.kind, capture.image);
        }

        Ok(Self {
            sections,
            images,
            converter,
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn image(&self, kind: SectionKind) -> Option<&DynamicImage> {
        self.images.get(&kind)
    }

    pub fn converter(&self) -> UnitConverter {
        self.converter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn blank(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(w, h))
    }

    #[test]
    fn test_capture_skips_missing_regions() {
        let rasterizer = MemoryRasterizer::new()
            .with_region("header", blank(420, 60))
            .with_region("totals", blank(420, 40));
        let kinds = [SectionKind::Header, SectionKind::Info, SectionKind::Totals];
        let captures = capture_sections(&rasterizer, &kinds);
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[1].kind, SectionKind::Totals);
    }

    #[test]
    fn test_measure_converts_heights() {
        let captures = vec![
            Capture {
                kind: SectionKind::Header,
                image: blank(420, 84),
            },
            Capture {
                kind: SectionKind::Item(0),
                image: blank(420, 20),
            },
        ];
        let set = SectionSet::measure(captures, 210.0).unwrap();
        // 2 px per mm
        assert!((set.sections()[0].height_mm - 42.0).abs() < 0.001);
        assert!((set.sections()[1].height_mm - 10.0).abs() < 0.001);
        assert!(set.image(SectionKind::Item(0)).is_some());
    }

    #[test]
    fn test_measure_without_sections_fails() {
        assert!(matches!(
            SectionSet::measure(Vec::new(), 210.0),
            Err(LayoutError::NoReferenceSection)
        ));
    }

    #[test]
    fn test_crop_rows_bounds() {
        let img = blank(10, 100);
        let cropped = crop_rows(&img, 40, 60).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (10, 60));
        assert!(crop_rows(&img, 50, 60).is_err());
        assert!(crop_rows(&img, 0, 0).is_err());
    }
}
