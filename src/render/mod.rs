//! PDF rendering

pub mod assembler;
pub mod helpers;

pub use assembler::{page_label, DocumentAssembler};
pub use helpers::{compress_pdf, LayerBuilder};
