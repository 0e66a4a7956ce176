//! End-to-end document generation
//!
//! capture -> measure -> pack -> assemble -> (optional) Factur-X embedding

use std::fmt;

use crate::capture::{capture_sections, Rasterizer, SectionSet};
use crate::compliance::{
    generate_facturx_xml, validate_compliance_data, ComplianceEmbedder, ComplianceRequest,
};
use crate::config::Settings;
use crate::error::GenerateError;
use crate::layout::{pack_sections, PackerConfig};
use crate::model::{DocumentData, DocumentKind, SectionKind};
use crate::render::DocumentAssembler;

/// What happened to the e-invoicing step
#[derive(Debug, Clone, PartialEq)]
pub enum ComplianceStatus {
    /// XML attached, bytes are the compliant PDF
    Embedded,
    /// Quotes never carry e-invoicing XML
    NotApplicable,
    /// Turned off in settings or no embedder supplied
    Disabled,
    /// Required data missing; the plain PDF was kept
    Incomplete(Vec<String>),
    /// Embedder failed; the plain PDF was kept
    Failed(String),
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Embedded => write!(f, "Factur-X embedded"),
            ComplianceStatus::NotApplicable => write!(f, "Factur-X not applicable"),
            ComplianceStatus::Disabled => write!(f, "Factur-X disabled"),
            ComplianceStatus::Incomplete(errors) => {
                write!(f, "Factur-X skipped, incomplete data: {}", errors.join(", "))
            }
            ComplianceStatus::Failed(reason) => {
                write!(f, "Factur-X embedding failed: {}", reason)
            }
        }
    }
}

/// A finished document
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub page_count: usize,
    pub compliance: ComplianceStatus,
    /// Non-fatal problems worth surfacing to the user
    pub warnings: Vec<String>,
}

/// Generate a paginated PDF for `data`
///
/// Fails only when no section could be captured or rendering fails.
/// Compliance problems degrade to the plain PDF plus a warning.
pub fn generate_document<R: Rasterizer + ?Sized>(
    data: &DocumentData,
    kind: DocumentKind,
    rasterizer: &R,
    settings: &Settings,
    embedder: Option<&dyn ComplianceEmbedder>,
) -> Result<GeneratedDocument, GenerateError> {
    let mut warnings = Vec::new();

    let kinds = SectionKind::document_order(data.items.len());
    let captures = capture_sections(rasterizer, &kinds);
    log::info!("Captured {} of {} sections", captures.len(), kinds.len());

    if !captures.iter().any(|c| c.kind.is_item()) && !data.items.is_empty() {
        warnings.push("no line item could be captured".to_string());
    }

    let sections = SectionSet::measure(captures, settings.page_width)?;
    let pages = pack_sections(sections.sections(), &PackerConfig::from_settings(settings))?;
    log::info!("Packed into {} pages", pages.len());

    let request = ComplianceRequest::new(data, kind);
    let plain = DocumentAssembler::new(settings, rasterizer).assemble(
        &pages,
        &sections,
        &request.title(),
    )?;

    let (bytes, compliance) = apply_compliance(plain, data, &request, settings, embedder);
    match &compliance {
        ComplianceStatus::Incomplete(_) | ComplianceStatus::Failed(_) => {
            log::warn!("{}", compliance);
            warnings.push(compliance.to_string());
        }
        other => log::debug!("{}", other),
    }

    Ok(GeneratedDocument {
        bytes,
        file_name: data.file_name(kind),
        page_count: pages.len(),
        compliance,
        warnings,
    })
}

fn apply_compliance(
    plain: Vec<u8>,
    data: &DocumentData,
    request: &ComplianceRequest,
    settings: &Settings,
    embedder: Option<&dyn ComplianceEmbedder>,
) -> (Vec<u8>, ComplianceStatus) {
    if !request.document_kind.supports_compliance() {
        return (plain, ComplianceStatus::NotApplicable);
    }
    let Some(embedder) = embedder.filter(|_| settings.facturx_enabled) else {
        return (plain, ComplianceStatus::Disabled);
    };

    let validation = validate_compliance_data(data);
    if !validation.is_valid() {
        return (plain, ComplianceStatus::Incomplete(validation.errors));
    }

    let xml = generate_facturx_xml(data, request.document_kind);
    match embedder.embed(&plain, &xml, request) {
        Ok(bytes) => (bytes, ComplianceStatus::Embedded),
        Err(e) => (plain, ComplianceStatus::Failed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MemoryRasterizer;
    use crate::error::{ComplianceError, LayoutError};
    use crate::model::{Client, CompanyInfo, LineItem};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::cell::Cell;

    fn block(h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(210, h, Rgb([240, 240, 240])))
    }

    /// 1 px per mm once measured against the 210mm page width
    fn rasterizer(items: usize, item_h: u32) -> MemoryRasterizer {
        let mut r = MemoryRasterizer::new()
            .with_region("header", block(50))
            .with_region("tableHeader", block(10))
            .with_region("totals", block(30))
            .with_region("footer", block(20));
        for i in 0..items {
            r.insert(format!("item-{}", i), block(item_h));
        }
        r
    }

    fn invoice(items: usize) -> DocumentData {
        DocumentData {
            number: Some("F-001".to_string()),
            issue_date: Some("2024-03-15".to_string()),
            company_info: Some(CompanyInfo {
                name: Some("Acme".to_string()),
                vat_number: Some("FR123".to_string()),
                ..Default::default()
            }),
            client: Some(Client {
                name: Some("Client".to_string()),
                ..Default::default()
            }),
            items: vec![
                LineItem {
                    quantity: 1.0,
                    unit_price: 10.0,
                    ..Default::default()
                };
                items
            ],
            ..Default::default()
        }
    }

    struct FailingEmbedder;

    impl ComplianceEmbedder for FailingEmbedder {
        fn embed(&self, _: &[u8], _: &str, _: &ComplianceRequest) -> Result<Vec<u8>, ComplianceError> {
            Err(ComplianceError::Transport("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingEmbedder {
        calls: Cell<usize>,
    }

    impl ComplianceEmbedder for CountingEmbedder {
        fn embed(&self, pdf: &[u8], _: &str, _: &ComplianceRequest) -> Result<Vec<u8>, ComplianceError> {
            self.calls.set(self.calls.get() + 1);
            Ok(pdf.to_vec())
        }
    }

    #[test]
    fn test_quote_skips_compliance() {
        let embedder = CountingEmbedder::default();
        let doc = generate_document(
            &invoice(2),
            DocumentKind::Quote,
            &rasterizer(2, 15),
            &Settings::default(),
            Some(&embedder),
        )
        .unwrap();

        assert_eq!(doc.compliance, ComplianceStatus::NotApplicable);
        assert_eq!(embedder.calls.get(), 0);
        assert_eq!(doc.file_name, "devis_F-001.pdf");
        assert_eq!(doc.page_count, 1);
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_embedder_failure_keeps_plain_pdf() {
        let doc = generate_document(
            &invoice(1),
            DocumentKind::Invoice,
            &rasterizer(1, 15),
            &Settings::default(),
            Some(&FailingEmbedder),
        )
        .unwrap();

        assert!(matches!(doc.compliance, ComplianceStatus::Failed(_)));
        assert_eq!(doc.warnings.len(), 1);
        assert!(doc.warnings[0].contains("connection refused"));
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_incomplete_data_is_reported() {
        let mut data = invoice(1);
        data.client = None;
        let embedder = CountingEmbedder::default();
        let doc = generate_document(
            &data,
            DocumentKind::CreditNote,
            &rasterizer(1, 15),
            &Settings::default(),
            Some(&embedder),
        )
        .unwrap();

        assert_eq!(
            doc.compliance,
            ComplianceStatus::Incomplete(vec!["missing client name".to_string()])
        );
        assert_eq!(embedder.calls.get(), 0);
        assert_eq!(doc.file_name, "avoir_F-001.pdf");
    }

    #[test]
    fn test_disabled_compliance() {
        let mut settings = Settings::default();
        settings.facturx_enabled = false;
        let embedder = CountingEmbedder::default();
        let doc = generate_document(
            &invoice(1),
            DocumentKind::Invoice,
            &rasterizer(1, 15),
            &settings,
            Some(&embedder),
        )
        .unwrap();
        assert_eq!(doc.compliance, ComplianceStatus::Disabled);
        assert_eq!(embedder.calls.get(), 0);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_embedder_called_once_for_valid_invoice() {
        let embedder = CountingEmbedder::default();
        let doc = generate_document(
            &invoice(1),
            DocumentKind::Invoice,
            &rasterizer(1, 15),
            &Settings::default(),
            Some(&embedder),
        )
        .unwrap();
        assert_eq!(doc.compliance, ComplianceStatus::Embedded);
        assert_eq!(embedder.calls.get(), 1);
    }

    #[test]
    fn test_many_items_spill_onto_more_pages() {
        // 275mm per page: 60 header block, then 40 items of 15mm
        let doc = generate_document(
            &invoice(40),
            DocumentKind::Quote,
            &rasterizer(40, 15),
            &Settings::default(),
            None,
        )
        .unwrap();
        assert!(doc.page_count >= 3);

        let pdf = lopdf::Document::load_mem(&doc.bytes).unwrap();
        assert_eq!(pdf.get_pages().len(), doc.page_count);
    }

    #[test]
    fn test_nothing_captured_is_an_error() {
        let result = generate_document(
            &invoice(1),
            DocumentKind::Invoice,
            &MemoryRasterizer::new(),
            &Settings::default(),
            None,
        );
        assert!(matches!(
            result,
            Err(GenerateError::Layout(LayoutError::NoReferenceSection))
        ));
    }
}
