//! Factur-X (EN 16931) CrossIndustryInvoice XML

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::{self, Write};

use crate::model::{Address, DocumentData, DocumentKind, LineItem};

const GUIDELINE_ID: &str = "urn:cen.eu:en16931:2017#compliant#urn:factur-x.eu:1p0:en16931";
const CURRENCY: &str = "EUR";
const DEFAULT_COUNTRY: &str = "FR";

/// UNTDID 1001 document type code
fn type_code(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::CreditNote => "381",
        _ => "380",
    }
}

/// Escape the five XML special characters
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a date as `YYYYMMDD` (format 102)
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS`
/// and epoch milliseconds (UTC). Returns `None` for anything else.
pub fn format_xml_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let date = if value.bytes().all(|b| b.is_ascii_digit()) {
        value
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive())
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
    };

    match date {
        Some(date) => Some(date.format("%Y%m%d").to_string()),
        None => {
            log::warn!("Invalid date for Factur-X: {}", value);
            None
        }
    }
}

fn country_code(address: Option<&Address>) -> String {
    let country = address
        .and_then(|a| a.country.as_deref())
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COUNTRY);
    country.chars().take(2).collect::<String>().to_uppercase()
}

/// Net base per VAT rate, ascending by rate
fn vat_breakdown(items: &[LineItem]) -> Vec<(f64, f64)> {
    let mut breakdown: Vec<(f64, f64)> = Vec::new();
    for item in items {
        let rate = item.vat_rate();
        match breakdown.iter_mut().find(|(r, _)| *r == rate) {
            Some((_, base)) => *base += item.net_total(),
            None => breakdown.push((rate, item.net_total())),
        }
    }
    breakdown.sort_by(|a, b| a.0.total_cmp(&b.0));
    breakdown
}

fn write_party(
    xml: &mut String,
    tag: &str,
    name: Option<&str>,
    address: Option<&Address>,
    vat_number: Option<&str>,
) -> fmt::Result {
    let street = address.and_then(|a| a.street.as_deref()).unwrap_or_default();
    let city = address.and_then(|a| a.city.as_deref()).unwrap_or_default();

    writeln!(xml, "      <ram:{}>", tag)?;
    writeln!(
        xml,
        "        <ram:Name>{}</ram:Name>",
        escape_xml(name.unwrap_or_default())
    )?;
    xml.push_str("        <ram:PostalTradeAddress>\n");
    writeln!(xml, "          <ram:LineOne>{}</ram:LineOne>", escape_xml(street))?;
    writeln!(xml, "          <ram:CityName>{}</ram:CityName>", escape_xml(city))?;
    writeln!(
        xml,
        "          <ram:CountryID>{}</ram:CountryID>",
        escape_xml(&country_code(address))
    )?;
    xml.push_str("        </ram:PostalTradeAddress>\n");
    if let Some(vat) = vat_number {
        xml.push_str("        <ram:SpecifiedTaxRegistration>\n");
        writeln!(xml, "          <ram:ID schemeID=\"VA\">{}</ram:ID>", escape_xml(vat))?;
        xml.push_str("        </ram:SpecifiedTaxRegistration>\n");
    }
    writeln!(xml, "      </ram:{}>", tag)
}

fn write_line_item(xml: &mut String, index: usize, item: &LineItem) -> fmt::Result {
    write!(
        xml,
        r#"    <ram:IncludedSupplyChainTradeLineItem>
      <ram:AssociatedDocumentLineDocument>
        <ram:LineID>{line}</ram:LineID>
      </ram:AssociatedDocumentLineDocument>
      <ram:SpecifiedTradeProduct>
        <ram:Name>{name}</ram:Name>
      </ram:SpecifiedTradeProduct>
      <ram:SpecifiedLineTradeAgreement>
        <ram:NetPriceProductTradePrice>
          <ram:ChargeAmount>{price:.2}</ram:ChargeAmount>
        </ram:NetPriceProductTradePrice>
      </ram:SpecifiedLineTradeAgreement>
      <ram:SpecifiedLineTradeDelivery>
        <ram:BilledQuantity unitCode="C62">{quantity:.2}</ram:BilledQuantity>
      </ram:SpecifiedLineTradeDelivery>
      <ram:SpecifiedLineTradeSettlement>
        <ram:ApplicableTradeTax>
          <ram:TypeCode>VAT</ram:TypeCode>
          <ram:CategoryCode>S</ram:CategoryCode>
          <ram:RateApplicablePercent>{rate}</ram:RateApplicablePercent>
        </ram:ApplicableTradeTax>
        <ram:SpecifiedTradeSettlementLineMonetarySummation>
          <ram:LineTotalAmount>{total:.2}</ram:LineTotalAmount>
        </ram:SpecifiedTradeSettlementLineMonetarySummation>
      </ram:SpecifiedLineTradeSettlement>
    </ram:IncludedSupplyChainTradeLineItem>
"#,
        line = index + 1,
        name = escape_xml(item.description.as_deref().unwrap_or_default()),
        price = item.unit_price,
        quantity = item.quantity,
        rate = item.vat_rate(),
        total = item.net_total(),
    )
}

/// Build the CrossIndustryInvoice XML for an invoice or credit note
pub fn generate_facturx_xml(data: &DocumentData, kind: DocumentKind) -> String {
    let mut xml = String::with_capacity(4096);
    // Writing into a String never fails
    let _ = write_document(&mut xml, data, kind);
    xml
}

fn write_document(xml: &mut String, data: &DocumentData, kind: DocumentKind) -> fmt::Result {
    let issue_date = data
        .issue_date
        .as_deref()
        .and_then(format_xml_date)
        .unwrap_or_default();

    write!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rsm:CrossIndustryInvoice xmlns:rsm="urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100" xmlns:qdt="urn:un:unece:uncefact:data:standard:QualifiedDataType:100" xmlns:ram="urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100" xmlns:udt="urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100">
  <rsm:ExchangedDocumentContext>
    <ram:GuidelineSpecifiedDocumentContextParameter>
      <ram:ID>{guideline}</ram:ID>
    </ram:GuidelineSpecifiedDocumentContextParameter>
  </rsm:ExchangedDocumentContext>
  <rsm:ExchangedDocument>
    <ram:ID>{number}</ram:ID>
    <ram:TypeCode>{type_code}</ram:TypeCode>
    <ram:IssueDateTime>
      <udt:DateTimeString format="102">{issue_date}</udt:DateTimeString>
    </ram:IssueDateTime>
  </rsm:ExchangedDocument>
  <rsm:SupplyChainTradeTransaction>
"#,
        guideline = GUIDELINE_ID,
        number = escape_xml(data.number.as_deref().unwrap_or_default()),
        type_code = type_code(kind),
        issue_date = issue_date,
    )?;

    for (index, item) in data.items.iter().enumerate() {
        write_line_item(xml, index, item)?;
    }

    let company = data.company_info.as_ref();
    let client = data.client.as_ref();

    xml.push_str("    <ram:ApplicableHeaderTradeAgreement>\n");
    write_party(
        xml,
        "SellerTradeParty",
        data.company_name(),
        company.and_then(|c| c.address.as_ref()),
        // The seller always carries a registration, even when empty
        Some(company.and_then(|c| c.vat_number.as_deref()).unwrap_or_default()),
    )?;
    write_party(
        xml,
        "BuyerTradeParty",
        data.client_name(),
        client.and_then(|c| c.address.as_ref()),
        client
            .and_then(|c| c.vat_number.as_deref())
            .filter(|v| !v.is_empty()),
    )?;
    xml.push_str("    </ram:ApplicableHeaderTradeAgreement>\n");
    xml.push_str("    <ram:ApplicableHeaderTradeDelivery></ram:ApplicableHeaderTradeDelivery>\n");

    xml.push_str("    <ram:ApplicableHeaderTradeSettlement>\n");
    writeln!(xml, "      <ram:InvoiceCurrencyCode>{}</ram:InvoiceCurrencyCode>", CURRENCY)?;

    let bank = data.bank_details.as_ref();
    if let Some(iban) = bank.and_then(|b| b.iban.as_deref()).filter(|i| !i.is_empty()) {
        xml.push_str("      <ram:SpecifiedTradeSettlementPaymentMeans>\n");
        xml.push_str("        <ram:TypeCode>30</ram:TypeCode>\n");
        xml.push_str("        <ram:PayeePartyCreditorFinancialAccount>\n");
        writeln!(xml, "          <ram:IBANID>{}</ram:IBANID>", escape_xml(iban))?;
        if let Some(bic) = bank.and_then(|b| b.bic.as_deref()).filter(|b| !b.is_empty()) {
            writeln!(
                xml,
                "          <ram:ProprietaryID>{}</ram:ProprietaryID>",
                escape_xml(bic)
            )?;
        }
        xml.push_str("        </ram:PayeePartyCreditorFinancialAccount>\n");
        xml.push_str("      </ram:SpecifiedTradeSettlementPaymentMeans>\n");
    }

    for (rate, base) in vat_breakdown(&data.items) {
        write!(
            xml,
            r#"      <ram:ApplicableTradeTax>
        <ram:CalculatedAmount>{amount:.2}</ram:CalculatedAmount>
        <ram:TypeCode>VAT</ram:TypeCode>
        <ram:BasisAmount>{base:.2}</ram:BasisAmount>
        <ram:CategoryCode>S</ram:CategoryCode>
        <ram:RateApplicablePercent>{rate}</ram:RateApplicablePercent>
      </ram:ApplicableTradeTax>
"#,
            amount = base * rate / 100.0,
            base = base,
            rate = rate,
        )?;
    }

    if let Some(due) = data.due_date.as_deref().filter(|d| !d.is_empty()) {
        write!(
            xml,
            r#"      <ram:SpecifiedTradePaymentTerms>
        <ram:DueDateDateTime>
          <udt:DateTimeString format="102">{}</udt:DateTimeString>
        </ram:DueDateDateTime>
      </ram:SpecifiedTradePaymentTerms>
"#,
            format_xml_date(due).unwrap_or_default()
        )?;
    }

    let total_ht = data.final_total_ht.unwrap_or(0.0);
    let total_vat = data.total_vat.unwrap_or(0.0);
    let total_ttc = data.final_total_ttc.unwrap_or(0.0);
    write!(
        xml,
        r#"      <ram:SpecifiedTradeSettlementHeaderMonetarySummation>
        <ram:LineTotalAmount>{ht:.2}</ram:LineTotalAmount>
        <ram:TaxBasisTotalAmount>{ht:.2}</ram:TaxBasisTotalAmount>
        <ram:TaxTotalAmount currencyID="{currency}">{vat:.2}</ram:TaxTotalAmount>
        <ram:GrandTotalAmount>{ttc:.2}</ram:GrandTotalAmount>
        <ram:DuePayableAmount>{ttc:.2}</ram:DuePayableAmount>
      </ram:SpecifiedTradeSettlementHeaderMonetarySummation>
    </ram:ApplicableHeaderTradeSettlement>
  </rsm:SupplyChainTradeTransaction>
</rsm:CrossIndustryInvoice>
"#,
        ht = total_ht,
        vat = total_vat,
        ttc = total_ttc,
        currency = CURRENCY,
    )
}
