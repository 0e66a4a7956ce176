pub mod capture;
pub mod cli;
pub mod compliance;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod render;

pub use capture::{DirectoryRasterizer, MemoryRasterizer, Rasterizer};
pub use compliance::{ComplianceEmbedder, HttpEmbedder, LocalEmbedder};
pub use config::Settings;
pub use error::{GenerateError, LayoutError, RenderError};
pub use model::{DocumentData, DocumentKind};
pub use pipeline::{generate_document, ComplianceStatus, GeneratedDocument};
