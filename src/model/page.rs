use super::section::{PlacedSection, SectionKind};

/// Lifecycle of a page while the packer fills it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Accumulating,
    /// No further sections may be added
    Full,
    Closed,
}

/// One output page and the sections placed on it
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub sections: Vec<PlacedSection>,
    /// Height consumed so far, spacing included
    pub current_height: f32,
    pub state: PageState,
}

impl Page {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            sections: Vec::new(),
            current_height: 0.0,
            state: PageState::Accumulating,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind == kind)
    }

    pub fn has_items(&self) -> bool {
        self.sections.iter().any(|s| s.kind.is_item())
    }

    /// Placements of `kind` on this page
    pub fn placements(&self, kind: SectionKind) -> impl Iterator<Item = &PlacedSection> {
        self.sections.iter().filter(move |s| s.kind == kind)
    }
}
