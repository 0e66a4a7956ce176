use thiserror::Error;

use crate::model::SectionKind;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("No reference section captured: cannot compute pixel-to-mm ratio")]
    NoReferenceSection,

    #[error("Section {kind} is {height_mm:.1}mm tall but a page only holds {available_mm:.1}mm")]
    SectionTooLarge {
        kind: SectionKind,
        height_mm: f32,
        available_mm: f32,
    },

    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to read section image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode section image {region}: {message}")]
    Decode { region: String, message: String },

    #[error("Invalid crop: rows {start}..{end} of an image {height}px tall")]
    InvalidCrop { start: u32, end: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Missing image for section {0}")]
    MissingImage(SectionKind),

    #[error("Failed to crop section image: {0}")]
    Capture(#[from] CaptureError),

    #[error("PDF generation error: {0}")]
    PdfGeneration(String),

    #[error("PDF compression error: {0}")]
    Compression(String),
}

#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Failed to process PDF: {0}")]
    Pdf(String),

    #[error("Compliance service unreachable: {0}")]
    Transport(String),

    #[error("Compliance service rejected the document: {0}")]
    Rejected(String),

    #[error("Invalid compliance service response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid color specification: {0}")]
    InvalidColor(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Errors that abort a whole generation run
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
