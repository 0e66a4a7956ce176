//! Remote Factur-X embedding service
//!
//! The service receives the plain PDF and the XML and answers with a
//! PDF/A-3 document:
//!
//! ```text
//! POST { "pdfBase64", "xmlString", "invoiceNumber", "documentType" }
//!   -> { "success": true, "pdfBase64": "..." }
//!    | { "success": false, "error": "..." }
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ComplianceEmbedder, ComplianceRequest};
use crate::error::ComplianceError;
use crate::model::DocumentKind;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    pdf_base64: String,
    xml_string: &'a str,
    invoice_number: &'a str,
    document_type: DocumentKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbedResponse {
    success: bool,
    pdf_base64: Option<String>,
    error: Option<String>,
}

/// Delegates embedding to an HTTP service
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    url: String,
    timeout: Duration,
}

impl HttpEmbedder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Interpret the service's JSON answer
fn decode_response(body: &[u8]) -> Result<Vec<u8>, ComplianceError> {
    let response: EmbedResponse = serde_json::from_slice(body)
        .map_err(|e| ComplianceError::InvalidResponse(e.to_string()))?;

    if !response.success {
        return Err(ComplianceError::Rejected(
            response.error.unwrap_or_else(|| "no reason given".to_string()),
        ));
    }

    let encoded = response
        .pdf_base64
        .ok_or_else(|| ComplianceError::InvalidResponse("missing pdfBase64".to_string()))?;
    let pdf = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ComplianceError::InvalidResponse(format!("bad base64: {}", e)))?;

    if !pdf.starts_with(b"%PDF") {
        return Err(ComplianceError::InvalidResponse(
            "payload is not a PDF".to_string(),
        ));
    }
    Ok(pdf)
}

impl ComplianceEmbedder for HttpEmbedder {
    fn embed(
        &self,
        pdf: &[u8],
        xml: &str,
        request: &ComplianceRequest,
    ) -> Result<Vec<u8>, ComplianceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ComplianceError::Transport(e.to_string()))?;

        let body = EmbedRequest {
            pdf_base64: STANDARD.encode(pdf),
            xml_string: xml,
            invoice_number: &request.invoice_number,
            document_type: request.document_kind,
        };

        log::debug!("Posting {} to {}", request.title(), self.url);
        let resp = client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .map_err(|e| ComplianceError::Transport(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .map_err(|e| ComplianceError::Transport(e.to_string()))?;

        // Error statuses may still carry a { success: false, error } body
        match decode_response(&bytes) {
            Err(ComplianceError::InvalidResponse(_)) if !status.is_success() => Err(
                ComplianceError::Rejected(format!("service returned {}", status)),
            ),
            other => other,
        }
    }
}
