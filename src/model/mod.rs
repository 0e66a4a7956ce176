pub mod document;
pub mod page;
pub mod section;

pub use document::{
    Address, Appearance, BankDetails, Client, CompanyInfo, DiscountType, DocumentData,
    DocumentKind, LineItem,
};
pub use page::{Page, PageState};
pub use section::{PartialSlice, PlacedSection, Section, SectionKind};
