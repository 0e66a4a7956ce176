//! PDF compression helper
//!
//! Uses lopdf to compress PDF streams after printpdf generates uncompressed output.

use std::io::Cursor;

use crate::error::RenderError;

/// Compress PDF streams to reduce file size.
///
/// Section images are embedded as raw pixel streams, so an assembled
/// document is several times larger than it needs to be until its streams
/// are deflated.
pub fn compress_pdf(uncompressed: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    let mut doc = lopdf::Document::load_mem(&uncompressed)
        .map_err(|e| RenderError::Compression(format!("Failed to parse PDF: {}", e)))?;

    doc.compress();

    let mut output = Cursor::new(Vec::new());
    doc.save_to(&mut output)
        .map_err(|e| RenderError::Compression(format!("Failed to save PDF: {}", e)))?;

    Ok(output.into_inner())
}
