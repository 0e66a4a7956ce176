use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of business document being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    #[default]
    Invoice,
    Quote,
    CreditNote,
}

impl DocumentKind {
    /// French label used in file names
    pub fn file_label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "facture",
            DocumentKind::Quote => "devis",
            DocumentKind::CreditNote => "avoir",
        }
    }

    /// Title used in PDF metadata
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::CreditNote => "Avoir",
            DocumentKind::Quote => "Devis",
            DocumentKind::Invoice => "Facture",
        }
    }

    /// Only invoices and credit notes carry e-invoicing XML
    pub fn supports_compliance(&self) -> bool {
        matches!(self, DocumentKind::Invoice | DocumentKind::CreditNote)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Invoice => write!(f, "invoice"),
            DocumentKind::Quote => write!(f, "quote"),
            DocumentKind::CreditNote => write!(f, "creditNote"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    pub name: Option<String>,
    pub vat_number: Option<String>,
    pub siret: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub name: Option<String>,
    pub vat_number: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    #[default]
    Fixed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    /// VAT rate in percent; `None` means the standard 20%
    pub vat_rate: Option<f64>,
    pub discount: Option<f64>,
    pub discount_type: DiscountType,
}

impl LineItem {
    pub const DEFAULT_VAT_RATE: f64 = 20.0;

    pub fn vat_rate(&self) -> f64 {
        match self.vat_rate {
            Some(rate) if rate != 0.0 => rate,
            _ => Self::DEFAULT_VAT_RATE,
        }
    }

    /// Net line total after the line discount
    pub fn net_total(&self) -> f64 {
        let gross = self.quantity * self.unit_price;
        match self.discount {
            Some(discount) if discount > 0.0 => match self.discount_type {
                DiscountType::Percentage => gross * (1.0 - discount.min(100.0) / 100.0),
                DiscountType::Fixed => (gross - discount).max(0.0),
            },
            _ => gross,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub iban: Option<String>,
    pub bic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appearance {
    /// Brand color as `#RRGGBB`
    pub primary_color: Option<String>,
}

/// Data describing the document to generate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentData {
    pub number: Option<String>,
    pub prefix: Option<String>,
    /// ISO date, RFC 3339 timestamp or epoch milliseconds
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub company_info: Option<CompanyInfo>,
    pub client: Option<Client>,
    pub items: Vec<LineItem>,
    #[serde(rename = "finalTotalHT")]
    pub final_total_ht: Option<f64>,
    #[serde(rename = "totalVAT")]
    pub total_vat: Option<f64>,
    #[serde(rename = "finalTotalTTC")]
    pub final_total_ttc: Option<f64>,
    pub bank_details: Option<BankDetails>,
    pub appearance: Option<Appearance>,
}

impl DocumentData {
    pub fn company_name(&self) -> Option<&str> {
        self.company_info.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn brand_color(&self) -> Option<&str> {
        self.appearance
            .as_ref()
            .and_then(|a| a.primary_color.as_deref())
    }

    /// Download file name: `{type}_{prefix-}{number}.pdf`
    pub fn file_name(&self, kind: DocumentKind) -> String {
        let number = self
            .number
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("document");
        match self.prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{}_{}-{}.pdf", kind.file_label(), prefix, number),
            None => format!("{}_{}.pdf", kind.file_label(), number),
        }
    }
}
