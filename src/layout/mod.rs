//! Pagination of measured sections

pub mod packer;

pub use packer::{pack_sections, PackerConfig};
