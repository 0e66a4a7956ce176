//! In-process Factur-X embedding with lopdf
//!
//! Attaches the XML as an associated file, registers it in the catalog name
//! tree and adds the XMP metadata identifying the PDF as PDF/A-3B with the
//! Factur-X extension schema. Color profile and font embedding required for
//! strict PDF/A validation are out of scope; use [`super::HttpEmbedder`]
//! against a dedicated service when full conformance matters.

use chrono::Utc;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

use super::facturx::escape_xml;
use super::{ComplianceEmbedder, ComplianceRequest, FACTURX_FILE_NAME};
use crate::error::ComplianceError;

const SUBJECT: &str = "Factur-X Invoice";
const CREATOR: &str = concat!("invoice-pdf ", env!("CARGO_PKG_VERSION"));

fn pdf_err(e: lopdf::Error) -> ComplianceError {
    ComplianceError::Pdf(e.to_string())
}

/// Embeds Factur-X XML without leaving the process
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEmbedder;

impl LocalEmbedder {
    pub fn new() -> Self {
        Self
    }
}

impl ComplianceEmbedder for LocalEmbedder {
    fn embed(
        &self,
        pdf: &[u8],
        xml: &str,
        request: &ComplianceRequest,
    ) -> Result<Vec<u8>, ComplianceError> {
        let mut doc = Document::load_mem(pdf).map_err(pdf_err)?;
        // PDF/A-3 is based on PDF 1.7
        doc.version = "1.7".to_string();

        let now = Utc::now();
        let pdf_date = now.format("D:%Y%m%d%H%M%SZ").to_string();
        let title = request.title();

        let file_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "EmbeddedFile",
                "Subtype" => "text/xml",
                "Params" => dictionary! {
                    "Size" => xml.len() as i64,
                    "ModDate" => Object::string_literal(pdf_date.clone()),
                },
            },
            xml.as_bytes().to_vec(),
        ));

        let filespec_id = doc.add_object(dictionary! {
            "Type" => "Filespec",
            "F" => Object::string_literal(FACTURX_FILE_NAME),
            "UF" => Object::string_literal(FACTURX_FILE_NAME),
            "Desc" => Object::string_literal("Factur-X XML invoice"),
            "AFRelationship" => "Alternative",
            "EF" => dictionary! {
                "F" => file_id,
                "UF" => file_id,
            },
        });

        let xmp = xmp_metadata(&title, &now.to_rfc3339());
        let metadata_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "Metadata",
                "Subtype" => "XML",
            },
            xmp.into_bytes(),
        ));

        let catalog_id = doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(pdf_err)?;

        let mut names = existing_names(&doc, catalog_id);
        names.set(
            "EmbeddedFiles",
            dictionary! {
                "Names" => vec![Object::string_literal(FACTURX_FILE_NAME), filespec_id.into()],
            },
        );

        let catalog = doc
            .get_object_mut(catalog_id)
            .and_then(Object::as_dict_mut)
            .map_err(pdf_err)?;
        catalog.set("Names", names);
        catalog.set("AF", vec![Object::Reference(filespec_id)]);
        catalog.set("Metadata", metadata_id);

        let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", id);
                id
            }
        };
        let info = doc
            .get_object_mut(info_id)
            .and_then(Object::as_dict_mut)
            .map_err(pdf_err)?;
        info.set("Title", Object::string_literal(title));
        info.set("Subject", Object::string_literal(SUBJECT));
        info.set("Creator", Object::string_literal(CREATOR));
        info.set("ModDate", Object::string_literal(pdf_date));

        let mut output = Cursor::new(Vec::new());
        doc.save_to(&mut output)
            .map_err(|e| ComplianceError::Pdf(e.to_string()))?;
        log::info!("Embedded {} into {}", FACTURX_FILE_NAME, request.title());
        Ok(output.into_inner())
    }
}

/// The catalog's name dictionary, inline or referenced, or a fresh one
fn existing_names(doc: &Document, catalog_id: ObjectId) -> Dictionary {
    match doc.get_dictionary(catalog_id).and_then(|c| c.get(b"Names")) {
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .cloned()
            .unwrap_or_else(|_| Dictionary::new()),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    }
}

/// XMP packet with PDF/A-3B identification and the Factur-X extension schema
fn xmp_metadata(title: &str, created: &str) -> String {
    format!(
        r#"<?xpacket begin="{bom}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
      <pdfaid:part>3</pdfaid:part>
      <pdfaid:conformance>B</pdfaid:conformance>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default">{title}</rdf:li></rdf:Alt></dc:title>
      <dc:creator><rdf:Seq><rdf:li>{creator}</rdf:li></rdf:Seq></dc:creator>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/">
      <xmp:CreatorTool>{creator}</xmp:CreatorTool>
      <xmp:CreateDate>{created}</xmp:CreateDate>
      <xmp:ModifyDate>{created}</xmp:ModifyDate>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:pdf="http://ns.adobe.com/pdf/1.3/">
      <pdf:Producer>{creator}</pdf:Producer>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:fx="urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#">
      <fx:DocumentType>INVOICE</fx:DocumentType>
      <fx:DocumentFileName>{file}</fx:DocumentFileName>
      <fx:Version>1.0</fx:Version>
      <fx:ConformanceLevel>EN 16931</fx:ConformanceLevel>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:pdfaExtension="http://www.aiim.org/pdfa/ns/extension/" xmlns:pdfaSchema="http://www.aiim.org/pdfa/ns/schema#" xmlns:pdfaProperty="http://www.aiim.org/pdfa/ns/property#">
      <pdfaExtension:schemas>
        <rdf:Bag>
          <rdf:li rdf:parseType="Resource">
            <pdfaSchema:schema>Factur-X PDFA Extension Schema</pdfaSchema:schema>
            <pdfaSchema:namespaceURI>urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#</pdfaSchema:namespaceURI>
            <pdfaSchema:prefix>fx</pdfaSchema:prefix>
            <pdfaSchema:property>
              <rdf:Seq>
{properties}              </rdf:Seq>
            </pdfaSchema:property>
          </rdf:li>
        </rdf:Bag>
      </pdfaExtension:schemas>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
        bom = '\u{feff}',
        title = escape_xml(title),
        creator = CREATOR,
        created = created,
        file = FACTURX_FILE_NAME,
        properties = extension_properties(),
    )
}

fn extension_properties() -> String {
    const PROPERTIES: [(&str, &str); 4] = [
        ("DocumentFileName", "Name of the embedded XML invoice file"),
        ("DocumentType", "INVOICE"),
        ("Version", "Version of the Factur-X XML schema"),
        ("ConformanceLevel", "Conformance level of the embedded XML"),
    ];

    PROPERTIES
        .iter()
        .map(|(name, description)| {
            format!(
                r#"                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>{}</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>{}</pdfaProperty:description>
                </rdf:li>
"#,
                name, description
            )
        })
        .collect()
}
