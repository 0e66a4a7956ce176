//! Raster section images as PDF image XObjects

use image::DynamicImage;
use printpdf::{Pt, RawImage, RawImageData, RawImageFormat, XObjectTransform};

/// DPI the image XObject is declared at; placement scales from this size
const IMAGE_DPI: f32 = 300.0;

/// Convert 1 mm to points
const MM_TO_PT: f32 = 2.834_645_7;

/// Flatten a section image to 8-bit RGB for embedding
///
/// Alpha is dropped: sections are captured on an opaque white background.
pub fn to_raw_image(image: &DynamicImage) -> RawImage {
    let rgb = image.to_rgb8();
    RawImage {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        data_format: RawImageFormat::RGB8,
        pixels: RawImageData::U8(rgb.into_raw()),
        tag: Vec::new(),
    }
}

/// Transform stretching a `width_px` x `height_px` image over a box
///
/// The box is given by its bottom-left corner and size, all in mm.
pub fn placement_transform(
    width_px: u32,
    height_px: u32,
    x_mm: f32,
    y_mm: f32,
    width_mm: f32,
    height_mm: f32,
) -> XObjectTransform {
    // Natural size of the image at IMAGE_DPI, in points
    let natural_w = width_px.max(1) as f32 * 72.0 / IMAGE_DPI;
    let natural_h = height_px.max(1) as f32 * 72.0 / IMAGE_DPI;

    XObjectTransform {
        translate_x: Some(Pt(x_mm * MM_TO_PT)),
        translate_y: Some(Pt(y_mm * MM_TO_PT)),
        scale_x: Some(width_mm * MM_TO_PT / natural_w),
        scale_y: Some(height_mm * MM_TO_PT / natural_h),
        rotate: None,
        dpi: Some(IMAGE_DPI),
    }
}
