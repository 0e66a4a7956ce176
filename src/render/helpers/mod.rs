//! Helper utilities for PDF rendering

pub mod colors;
pub mod compress;
pub mod layer;
pub mod raster;
pub mod text_metrics;

pub use colors::{band_color, parse_hex_color, tint_over_white};
pub use compress::compress_pdf;
pub use layer::LayerBuilder;
pub use raster::{placement_transform, to_raw_image};
pub use text_metrics::{get_helvetica_measurer, BuiltinFontMeasurer};
