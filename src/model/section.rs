use std::fmt;

/// Logical block of a document, laid out independently before pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Header,
    Info,
    HeaderNotes,
    MarketAmount,
    TableHeader,
    /// Line item, 0-based
    Item(usize),
    Totals,
    VatExemption,
    Terms,
    SituationRecap,
    Footer,
}

impl SectionKind {
    /// Sections placed unconditionally at the top of the first page, in order
    pub const HEADER_BLOCK: [SectionKind; 5] = [
        SectionKind::Header,
        SectionKind::Info,
        SectionKind::HeaderNotes,
        SectionKind::MarketAmount,
        SectionKind::TableHeader,
    ];

    /// Sections that follow the totals and precede the footer, in order
    pub const TAIL: [SectionKind; 2] = [SectionKind::VatExemption, SectionKind::Terms];

    /// Region identifier handed to the rasterizer
    pub fn region_id(&self) -> String {
        match self {
            SectionKind::Header => "header".to_string(),
            SectionKind::Info => "info".to_string(),
            SectionKind::HeaderNotes => "headerNotes".to_string(),
            SectionKind::MarketAmount => "marketAmount".to_string(),
            SectionKind::TableHeader => "tableHeader".to_string(),
            SectionKind::Item(i) => format!("item-{}", i),
            SectionKind::Totals => "totals".to_string(),
            SectionKind::VatExemption => "vatExemption".to_string(),
            SectionKind::Terms => "terms".to_string(),
            SectionKind::SituationRecap => "situationRecap".to_string(),
            SectionKind::Footer => "footer".to_string(),
        }
    }

    /// Whether a section of this kind may be split across a page boundary
    pub fn breakable_by_default(&self) -> bool {
        matches!(self, SectionKind::VatExemption | SectionKind::Terms)
    }

    pub fn is_item(&self) -> bool {
        matches!(self, SectionKind::Item(_))
    }

    /// Full document order for a document with `item_count` line items
    pub fn document_order(item_count: usize) -> Vec<SectionKind> {
        let mut kinds = Vec::with_capacity(item_count + 11);
        kinds.extend(Self::HEADER_BLOCK);
        kinds.extend((0..item_count).map(SectionKind::Item));
        kinds.push(SectionKind::Totals);
        kinds.extend(Self::TAIL);
        kinds.push(SectionKind::SituationRecap);
        kinds.push(SectionKind::Footer);
        kinds
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Item(i) => write!(f, "item[{}]", i),
            other => f.write_str(&other.region_id()),
        }
    }
}

/// A measured section ready for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// Height in millimeters
    pub height_mm: f32,
    pub can_break: bool,
}

impl Section {
    pub fn new(kind: SectionKind, height_mm: f32) -> Self {
        Self {
            kind,
            height_mm,
            can_break: kind.breakable_by_default(),
        }
    }

    pub fn with_break(mut self, can_break: bool) -> Self {
        self.can_break = can_break;
        self
    }
}

/// Vertical slice of a section that was split across pages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialSlice {
    /// Offset of the slice from the top of the section, in mm
    pub start_mm: f32,
    pub height_mm: f32,
}

/// A section (or a slice of one) positioned on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    pub kind: SectionKind,
    /// Offset from the top of the page content area, in mm
    pub y_mm: f32,
    /// Height actually occupied on this page
    pub height_mm: f32,
    pub partial: Option<PartialSlice>,
    /// Drawn edge to edge, ignoring the left/right margins
    pub full_width: bool,
}

impl PlacedSection {
    pub fn is_partial(&self) -> bool {
        self.partial.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_ids() {
        assert_eq!(SectionKind::HeaderNotes.region_id(), "headerNotes");
        assert_eq!(SectionKind::Item(3).region_id(), "item-3");
        assert_eq!(SectionKind::SituationRecap.region_id(), "situationRecap");
    }

    #[test]
    fn test_breakable_defaults() {
        assert!(Section::new(SectionKind::Terms, 10.0).can_break);
        assert!(Section::new(SectionKind::VatExemption, 10.0).can_break);
        assert!(!Section::new(SectionKind::Totals, 10.0).can_break);
        assert!(!Section::new(SectionKind::Item(0), 10.0).can_break);
    }

    #[test]
    fn test_document_order() {
        let order = SectionKind::document_order(2);
        assert_eq!(order.len(), 13);
        assert_eq!(order[0], SectionKind::Header);
        assert_eq!(order[5], SectionKind::Item(0));
        assert_eq!(order[6], SectionKind::Item(1));
        assert_eq!(order[7], SectionKind::Totals);
        assert_eq!(*order.last().unwrap(), SectionKind::Footer);
    }
}
