//! Greedy page packer
//!
//! Assigns measured sections to fixed-size pages in a single forward pass.
//! Heights are known up front, so no placement is ever revisited.
//!
//! Footer space is only reserved when placing the totals, never while
//! placing line items: items are packed as densely as possible even if that
//! pushes the totals or the footer onto a later page.

use crate::config::Settings;
use crate::error::LayoutError;
use crate::model::{Page, PageState, PartialSlice, PlacedSection, Section, SectionKind};

/// Page constraints used by the packer, all in mm
#[derive(Debug, Clone, PartialEq)]
pub struct PackerConfig {
    /// Page height minus top margin minus pagination band
    pub available_height: f32,
    pub section_spacing: f32,
    pub item_spacing: f32,
    /// A breakable section is only split when more than this remains
    pub min_split_space: f32,
    /// Reject oversized non-breakable sections instead of overflowing
    pub strict: bool,
}

impl PackerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            available_height: settings.available_height(),
            section_spacing: settings.section_spacing,
            item_spacing: settings.item_spacing,
            min_split_space: settings.min_split_space,
            strict: settings.strict_layout,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.available_height <= self.min_split_space {
            return Err(LayoutError::InvalidGeometry(format!(
                "available height {:.1}mm must exceed the minimum split space {:.1}mm",
                self.available_height, self.min_split_space
            )));
        }
        if self.section_spacing < 0.0 || self.item_spacing < 0.0 || self.min_split_space < 0.0 {
            return Err(LayoutError::InvalidGeometry(
                "spacings must not be negative".to_string(),
            ));
        }
        // A split slice is remaining - spacing, which must stay positive
        if self.section_spacing > self.min_split_space {
            return Err(LayoutError::InvalidGeometry(format!(
                "section spacing {:.1}mm must not exceed the minimum split space {:.1}mm",
                self.section_spacing, self.min_split_space
            )));
        }
        Ok(())
    }
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Pack `sections` into pages
///
/// Sections are picked up by kind: the header block, line items in input
/// order, totals, vat exemption and terms, situation recap, footer.
pub fn pack_sections(sections: &[Section], config: &PackerConfig) -> Result<Vec<Page>, LayoutError> {
    config.validate()?;

    let find = |kind: SectionKind| sections.iter().find(|s| s.kind == kind);
    let table_header = find(SectionKind::TableHeader);
    let footer = find(SectionKind::Footer);
    let tail: Vec<&Section> = SectionKind::TAIL.iter().filter_map(|&k| find(k)).collect();

    let mut packer = Packer::new(config);

    // Header block: always on page 1, never checked against the page height
    for kind in SectionKind::HEADER_BLOCK {
        if let Some(section) = find(kind) {
            packer.place(section.kind, section.height_mm, config.section_spacing, None, false);
        }
    }

    let item_limit = match table_header {
        Some(th) => config.available_height - th.height_mm - config.section_spacing,
        None => config.available_height,
    };
    for item in sections.iter().filter(|s| s.kind.is_item()) {
        packer.check_size(item, item_limit)?;
        if !packer.fits(item.height_mm + config.item_spacing) && !packer.is_fresh() {
            packer.new_page();
            if let Some(th) = table_header {
                packer.place(th.kind, th.height_mm, config.section_spacing, None, false);
            }
        }
        packer.place(item.kind, item.height_mm, config.item_spacing, None, false);
    }

    if let Some(totals) = find(SectionKind::Totals) {
        packer.check_size(totals, config.available_height)?;
        let footer_height = footer.map(|f| f.height_mm).unwrap_or(0.0);
        let tail_height: f32 = tail
            .iter()
            .map(|s| s.height_mm + config.section_spacing)
            .sum();
        let everything_fits = packer.fits(
            totals.height_mm + config.section_spacing + tail_height + footer_height,
        );
        // The footer directly follows the totals only when no tail section or
        // recap sits in between; a recap always pushes it to a later page
        let footer_follows = tail.is_empty() && find(SectionKind::SituationRecap).is_none();
        let reserve_footer = everything_fits || footer_follows;
        let reserved = if reserve_footer { footer_height } else { 0.0 };
        log::debug!(
            "Totals: reserve_footer={} remaining={:.1}mm",
            reserve_footer,
            packer.remaining()
        );

        if !packer.fits(totals.height_mm + config.section_spacing + reserved)
            && !packer.current.is_empty()
        {
            packer.new_page();
        }
        packer.place(totals.kind, totals.height_mm, config.section_spacing, None, false);
    }

    for section in tail {
        if section.can_break {
            packer.place_breakable(section);
        } else {
            packer.check_size(section, config.available_height)?;
            if !packer.fits(section.height_mm + config.section_spacing)
                && !packer.current.is_empty()
            {
                packer.new_page();
            }
            packer.place(section.kind, section.height_mm, config.section_spacing, None, false);
        }
    }

    if let Some(recap) = find(SectionKind::SituationRecap) {
        packer.check_size(recap, config.available_height)?;
        if !packer.current.is_empty() {
            packer.new_page();
        }
        packer.place(recap.kind, recap.height_mm, config.section_spacing, None, true);
        packer.current.state = PageState::Full;
    }

    if let Some(footer) = footer {
        packer.check_size(footer, config.available_height)?;
        if packer.current.state == PageState::Full
            || (!packer.fits(footer.height_mm) && !packer.current.is_empty())
        {
            packer.new_page();
        }
        packer.place(footer.kind, footer.height_mm, 0.0, None, false);
    }

    Ok(packer.finish())
}

struct Packer<'a> {
    config: &'a PackerConfig,
    pages: Vec<Page>,
    current: Page,
}

impl<'a> Packer<'a> {
    fn new(config: &'a PackerConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Page::new(1),
        }
    }

    fn remaining(&self) -> f32 {
        self.config.available_height - self.current.current_height
    }

    fn fits(&self, height: f32) -> bool {
        self.current.current_height + height <= self.config.available_height
    }

    /// Page holds nothing but (possibly) a repeated table header
    fn is_fresh(&self) -> bool {
        self.current
            .sections
            .iter()
            .all(|s| s.kind == SectionKind::TableHeader)
    }

    fn check_size(&self, section: &Section, limit: f32) -> Result<(), LayoutError> {
        if section.height_mm <= limit {
            return Ok(());
        }
        if self.config.strict {
            return Err(LayoutError::SectionTooLarge {
                kind: section.kind,
                height_mm: section.height_mm,
                available_mm: limit,
            });
        }
        log::warn!(
            "Section {} ({:.1}mm) is taller than a page ({:.1}mm) and will overflow",
            section.kind,
            section.height_mm,
            limit
        );
        Ok(())
    }

    fn place(
        &mut self,
        kind: SectionKind,
        height_mm: f32,
        spacing: f32,
        partial: Option<PartialSlice>,
        full_width: bool,
    ) {
        self.current.sections.push(PlacedSection {
            kind,
            y_mm: self.current.current_height,
            height_mm,
            partial,
            full_width,
        });
        self.current.current_height += height_mm + spacing;
    }

    /// Place a breakable section, slicing it across as many pages as needed
    fn place_breakable(&mut self, section: &Section) {
        let spacing = self.config.section_spacing;
        let mut start = 0.0_f32;
        let mut left = section.height_mm;

        loop {
            let remaining = self.remaining();
            if left + spacing <= remaining {
                let partial = (start > 0.0).then_some(PartialSlice {
                    start_mm: start,
                    height_mm: left,
                });
                self.place(section.kind, left, spacing, partial, false);
                return;
            }

            if remaining > self.config.min_split_space {
                let slice = remaining - spacing;
                log::debug!(
                    "Splitting {} at {:.1}mm ({:.1}mm on page {})",
                    section.kind,
                    start + slice,
                    slice,
                    self.current.number
                );
                self.place(
                    section.kind,
                    slice,
                    spacing,
                    Some(PartialSlice {
                        start_mm: start,
                        height_mm: slice,
                    }),
                    false,
                );
                start += slice;
                left -= slice;
            }

            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let next = Page::new(self.current.number + 1);
        let mut closed = std::mem::replace(&mut self.current, next);
        closed.state = PageState::Closed;
        log::debug!(
            "Closed page {} at {:.1}mm",
            closed.number,
            closed.current_height
        );
        self.pages.push(closed);
    }

    fn finish(mut self) -> Vec<Page> {
        self.current.state = PageState::Closed;
        self.pages.push(self.current);
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(kind: SectionKind, h: f32) -> Section {
        Section::new(kind, h)
    }

    fn config() -> PackerConfig {
        PackerConfig::default()
    }

    /// Sum of placed heights and trailing spacing must stay within the page
    fn assert_within_bounds(pages: &[Page], config: &PackerConfig) {
        for page in pages {
            for placed in &page.sections {
                assert!(
                    placed.y_mm + placed.height_mm <= config.available_height + 1e-3,
                    "{} overflows page {}",
                    placed.kind,
                    page.number
                );
            }
        }
    }

    #[test]
    fn test_everything_on_one_page() {
        let sections = vec![
            s(SectionKind::Header, 40.0),
            s(SectionKind::Info, 30.0),
            s(SectionKind::TableHeader, 8.0),
            s(SectionKind::Item(0), 10.0),
            s(SectionKind::Item(1), 10.0),
            s(SectionKind::Totals, 25.0),
            s(SectionKind::Terms, 20.0),
            s(SectionKind::Footer, 15.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 1);
        let kinds: Vec<SectionKind> = pages[0].sections.iter().map(|p| p.kind).collect();
        let expected: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, expected);
        assert!(pages.iter().all(|p| p.state == PageState::Closed));
    }

    #[test]
    fn test_items_overflow_repeat_table_header() {
        let mut sections = vec![s(SectionKind::Header, 50.0), s(SectionKind::TableHeader, 8.0)];
        for i in 0..30 {
            sections.push(s(SectionKind::Item(i), 20.0));
        }
        sections.push(s(SectionKind::Totals, 30.0));
        let cfg = config();
        let pages = pack_sections(&sections, &cfg).unwrap();

        assert!(pages.len() > 1);
        for page in pages.iter().filter(|p| p.has_items()) {
            assert_eq!(page.sections[0].kind, match page.number {
                1 => SectionKind::Header,
                _ => SectionKind::TableHeader,
            });
            assert!(page.contains(SectionKind::TableHeader));
        }
        assert_eq!(pages[0].placements(SectionKind::TableHeader).count(), 1);
        assert_within_bounds(&pages, &cfg);
    }

    #[test]
    fn test_three_items_with_ninety_mm_left() {
        // 150 + 2 + 31 + 2 = 185mm used, 90mm left for items
        let sections = vec![
            s(SectionKind::Header, 150.0),
            s(SectionKind::TableHeader, 31.0),
            s(SectionKind::Item(0), 40.0),
            s(SectionKind::Item(1), 40.0),
            s(SectionKind::Item(2), 40.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains(SectionKind::Item(0)));
        assert!(pages[0].contains(SectionKind::Item(1)));
        assert!(!pages[0].contains(SectionKind::Item(2)));

        let second: Vec<SectionKind> = pages[1].sections.iter().map(|p| p.kind).collect();
        assert_eq!(second, vec![SectionKind::TableHeader, SectionKind::Item(2)]);
        assert_eq!(pages[1].sections[0].y_mm, 0.0);
    }

    #[test]
    fn test_totals_moves_when_footer_does_not_fit() {
        // 228 + 2 = 230mm used, 45mm left; totals 30 + footer 20 > 45
        let sections = vec![
            s(SectionKind::Header, 228.0),
            s(SectionKind::Totals, 30.0),
            s(SectionKind::Footer, 20.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(!pages[0].contains(SectionKind::Totals));
        let totals = pages[1].placements(SectionKind::Totals).next().unwrap();
        assert_eq!(totals.y_mm, 0.0);
        assert_eq!(totals.height_mm, 30.0);
        assert!(pages[1].contains(SectionKind::Footer));
    }

    #[test]
    fn test_totals_ignore_footer_when_tail_overflows() {
        let sections = vec![
            s(SectionKind::Header, 228.0),
            s(SectionKind::Totals, 30.0),
            s(SectionKind::Terms, 100.0),
            s(SectionKind::Footer, 20.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains(SectionKind::Totals));
        // 13mm left after totals: too little to split, terms deferred whole
        let terms = pages[1].placements(SectionKind::Terms).next().unwrap();
        assert!(!terms.is_partial());
        assert_eq!(terms.height_mm, 100.0);
        assert!(pages[1].contains(SectionKind::Footer));
    }

    #[test]
    fn test_totals_never_split() {
        for header in [0.0_f32, 100.0, 200.0, 240.0, 260.0, 270.0] {
            let sections = vec![
                s(SectionKind::Header, header),
                s(SectionKind::Totals, 60.0),
                s(SectionKind::VatExemption, 40.0),
                s(SectionKind::Footer, 25.0),
            ];
            let pages = pack_sections(&sections, &config()).unwrap();
            let placements: Vec<&PlacedSection> = pages
                .iter()
                .flat_map(|p| p.placements(SectionKind::Totals))
                .collect();
            assert_eq!(placements.len(), 1);
            assert_eq!(placements[0].height_mm, 60.0);
            assert!(placements[0].partial.is_none());
        }
    }

    #[test]
    fn test_long_terms_split_without_gaps() {
        let sections = vec![s(SectionKind::Header, 100.0), s(SectionKind::Terms, 500.0)];
        let cfg = config();
        let pages = pack_sections(&sections, &cfg).unwrap();
        assert_eq!(pages.len(), 3);

        let slices: Vec<PartialSlice> = pages
            .iter()
            .flat_map(|p| p.placements(SectionKind::Terms))
            .map(|p| p.partial.expect("every terms placement is a slice"))
            .collect();
        assert_eq!(slices.len(), 3);

        let mut expected_start = 0.0;
        for slice in &slices {
            assert!((slice.start_mm - expected_start).abs() < 1e-3);
            expected_start += slice.height_mm;
        }
        let total: f32 = slices.iter().map(|s| s.height_mm).sum();
        assert!((total - 500.0).abs() < 1e-3);
        assert_within_bounds(&pages, &cfg);
    }

    #[test]
    fn test_breakable_deferred_when_little_space_left() {
        // 253 + 2 = 255mm used, exactly 20mm left
        let sections = vec![s(SectionKind::Header, 253.0), s(SectionKind::Terms, 50.0)];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 2);
        let terms = pages[1].placements(SectionKind::Terms).next().unwrap();
        assert!(terms.partial.is_none());
        assert_eq!(terms.y_mm, 0.0);
    }

    #[test]
    fn test_non_breakable_tail_section_moves_whole() {
        let sections = vec![
            s(SectionKind::Header, 230.0),
            s(SectionKind::VatExemption, 60.0).with_break(false),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].placements(SectionKind::VatExemption).all(|p| !p.is_partial()));
    }

    #[test]
    fn test_situation_recap_on_own_page() {
        let sections = vec![
            s(SectionKind::Header, 40.0),
            s(SectionKind::Totals, 20.0),
            s(SectionKind::SituationRecap, 80.0),
            s(SectionKind::Footer, 15.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 3);

        let recap_page = &pages[1];
        assert_eq!(recap_page.sections.len(), 1);
        let recap = &recap_page.sections[0];
        assert_eq!(recap.kind, SectionKind::SituationRecap);
        assert_eq!(recap.y_mm, 0.0);
        assert!(recap.full_width);

        assert_eq!(pages[2].sections[0].kind, SectionKind::Footer);
        assert!(pages
            .iter()
            .flat_map(|p| &p.sections)
            .filter(|p| p.kind != SectionKind::SituationRecap)
            .all(|p| !p.full_width));
    }

    #[test]
    fn test_totals_stay_put_before_situation_recap() {
        // 230mm used; totals fit, but totals + footer would not
        let sections = vec![
            s(SectionKind::Header, 228.0),
            s(SectionKind::Totals, 30.0),
            s(SectionKind::SituationRecap, 80.0),
            s(SectionKind::Footer, 20.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains(SectionKind::Totals));
        assert_eq!(pages[1].sections[0].kind, SectionKind::SituationRecap);
        assert_eq!(pages[2].sections[0].kind, SectionKind::Footer);
    }

    #[test]
    fn test_footer_gets_own_page_when_full() {
        let sections = vec![
            s(SectionKind::Header, 200.0),
            s(SectionKind::Terms, 60.0),
            s(SectionKind::Footer, 20.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].sections.len(), 1);
        assert_eq!(pages[1].sections[0].kind, SectionKind::Footer);
    }

    #[test]
    fn test_oversized_item_overflows_alone() {
        let sections = vec![
            s(SectionKind::Header, 50.0),
            s(SectionKind::TableHeader, 10.0),
            s(SectionKind::Item(0), 10.0),
            s(SectionKind::Item(1), 400.0),
            s(SectionKind::Item(2), 10.0),
        ];
        let pages = pack_sections(&sections, &config()).unwrap();
        assert_eq!(pages.len(), 3);
        let kinds: Vec<SectionKind> = pages[1].sections.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![SectionKind::TableHeader, SectionKind::Item(1)]);
        assert!(pages[2].contains(SectionKind::Item(2)));
    }

    #[test]
    fn test_oversized_item_rejected_in_strict_mode() {
        let sections = vec![s(SectionKind::Header, 50.0), s(SectionKind::Item(0), 400.0)];
        let cfg = PackerConfig {
            strict: true,
            ..config()
        };
        let err = pack_sections(&sections, &cfg).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::SectionTooLarge {
                kind: SectionKind::Item(0),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_geometry() {
        let cfg = PackerConfig {
            available_height: 15.0,
            ..config()
        };
        assert!(matches!(
            pack_sections(&[], &cfg),
            Err(LayoutError::InvalidGeometry(_))
        ));

        let cfg = PackerConfig {
            section_spacing: 25.0,
            ..config()
        };
        assert!(matches!(
            pack_sections(&[], &cfg),
            Err(LayoutError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_page_numbers_are_sequential() {
        let mut sections = vec![s(SectionKind::TableHeader, 8.0)];
        for i in 0..40 {
            sections.push(s(SectionKind::Item(i), 25.0));
        }
        let pages = pack_sections(&sections, &config()).unwrap();
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
        }
    }
}
