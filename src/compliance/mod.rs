//! E-invoicing compliance
//!
//! Invoices and credit notes can carry a Factur-X XML attachment. The XML is
//! generated from the document data and handed to a [`ComplianceEmbedder`]
//! together with the rendered PDF. Embedding is best effort: the caller keeps
//! the plain PDF when data is incomplete or the embedder fails.

pub mod facturx;
pub mod http;
pub mod local;

use crate::error::ComplianceError;
use crate::model::{DocumentData, DocumentKind};

pub use facturx::{format_xml_date, generate_facturx_xml};
pub use http::HttpEmbedder;
pub use local::LocalEmbedder;

/// Name of the XML attachment inside the PDF
pub const FACTURX_FILE_NAME: &str = "factur-x.xml";

/// Identifies the document being made compliant
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceRequest {
    pub invoice_number: String,
    pub document_kind: DocumentKind,
}

impl ComplianceRequest {
    pub fn new(data: &DocumentData, kind: DocumentKind) -> Self {
        Self {
            invoice_number: data.number.clone().unwrap_or_default(),
            document_kind: kind,
        }
    }

    /// Document title, e.g. "Facture F-001"
    pub fn title(&self) -> String {
        format!("{} {}", self.document_kind.title(), self.invoice_number)
    }
}

/// Turns a plain PDF into a compliant one
pub trait ComplianceEmbedder {
    fn embed(
        &self,
        pdf: &[u8],
        xml: &str,
        request: &ComplianceRequest,
    ) -> Result<Vec<u8>, ComplianceError>;
}

/// Outcome of checking the data required by Factur-X
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceValidation {
    pub errors: Vec<String>,
}

impl ComplianceValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Check that the fields Factur-X requires are present
pub fn validate_compliance_data(data: &DocumentData) -> ComplianceValidation {
    let mut errors = Vec::new();

    if is_blank(data.number.as_deref()) {
        errors.push("missing invoice number".to_string());
    }
    if is_blank(data.issue_date.as_deref()) {
        errors.push("missing issue date".to_string());
    }
    if is_blank(data.company_name()) {
        errors.push("missing company name".to_string());
    }
    let vat_number = data
        .company_info
        .as_ref()
        .and_then(|c| c.vat_number.as_deref());
    if is_blank(vat_number) {
        errors.push("missing company VAT number".to_string());
    }
    if is_blank(data.client_name()) {
        errors.push("missing client name".to_string());
    }
    if data.items.is_empty() {
        errors.push("no line items".to_string());
    }

    for error in &errors {
        log::debug!("Factur-X validation: {}", error);
    }

    ComplianceValidation { errors }
}
