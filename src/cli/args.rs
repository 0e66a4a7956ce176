use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::model::DocumentKind;

#[derive(Parser, Debug)]
#[command(name = "invoice-pdf")]
#[command(
    author,
    version,
    about = "Paginate rasterized invoice sections into an A4 PDF, with optional Factur-X embedding"
)]
pub struct Args {
    /// Document data file (JSON)
    #[arg(short, long, required = true)]
    pub data: PathBuf,

    /// Directory holding one image per section (header.png, item-0.png, ...)
    #[arg(short, long, required = true)]
    pub sections: PathBuf,

    /// Output PDF file path (defaults to the generated document file name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Document type
    #[arg(short = 't', long = "type", value_enum, default_value = "invoice")]
    pub doc_type: DocType,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Brand color for the pagination band (e.g. "#5B4FFF")
    #[arg(long)]
    pub brand_color: Option<String>,

    /// Skip Factur-X XML embedding
    #[arg(long)]
    pub no_facturx: bool,

    /// Remote compliance service endpoint (embeds locally when omitted)
    #[arg(long)]
    pub embed_url: Option<String>,

    /// Fail instead of overflowing when a section is taller than a page
    #[arg(long)]
    pub strict_layout: bool,

    /// Do not compress PDF streams
    #[arg(long)]
    pub no_compress: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Document type accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum DocType {
    #[default]
    Invoice,
    Quote,
    CreditNote,
}

impl From<DocType> for DocumentKind {
    fn from(doc_type: DocType) -> Self {
        match doc_type {
            DocType::Invoice => DocumentKind::Invoice,
            DocType::Quote => DocumentKind::Quote,
            DocType::CreditNote => DocumentKind::CreditNote,
        }
    }
}

impl Args {
    pub fn document_kind(&self) -> DocumentKind {
        self.doc_type.into()
    }

    /// Get the output path, defaulting to the document's own file name
    pub fn output_path(&self, generated_name: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(generated_name))
    }

    /// Check if Factur-X embedding was requested
    pub fn facturx_enabled(&self) -> bool {
        !self.no_facturx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::parse_from(["invoice-pdf", "--data", "inv.json", "--sections", "out"]);
        assert_eq!(args.doc_type, DocType::Invoice);
        assert!(args.facturx_enabled());
        assert_eq!(args.output_path("facture_1.pdf"), PathBuf::from("facture_1.pdf"));
    }

    #[test]
    fn test_parse_credit_note() {
        let args = Args::parse_from([
            "invoice-pdf",
            "-d",
            "inv.json",
            "-s",
            "out",
            "-t",
            "credit-note",
            "--no-facturx",
            "-o",
            "x.pdf",
            "-vv",
        ]);
        assert_eq!(args.document_kind(), DocumentKind::CreditNote);
        assert!(!args.facturx_enabled());
        assert_eq!(args.output_path("ignored.pdf"), PathBuf::from("x.pdf"));
        assert_eq!(args.verbose, 2);
    }
}
