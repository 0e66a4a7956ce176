/// A4 page width in mm
pub const DEFAULT_PAGE_WIDTH: f32 = 210.0;

/// A4 page height in mm
pub const DEFAULT_PAGE_HEIGHT: f32 = 297.0;

/// Top margin above the first section of every page, in mm
pub const DEFAULT_MARGIN_TOP: f32 = 10.0;

/// Left and right document margins in mm
pub const DEFAULT_MARGIN_SIDE: f32 = 13.0;

/// Height of the "Page X / N" band at the bottom of every page, in mm
pub const DEFAULT_PAGINATION_BAND_HEIGHT: f32 = 12.0;

/// Gap below every section except line items, in mm
pub const DEFAULT_SECTION_SPACING: f32 = 2.0;

/// Gap between adjacent line items, in mm
pub const DEFAULT_ITEM_SPACING: f32 = 0.5;

/// A breakable section is split only when more than this remains on the page, in mm
pub const DEFAULT_MIN_SPLIT_SPACE: f32 = 20.0;

/// Brand color used when neither the document nor the CLI provides one
pub const DEFAULT_BRAND_COLOR: (u8, u8, u8) = (0x5B, 0x4F, 0xFF);

/// Opacity of the brand color blended over white for the pagination band
pub const DEFAULT_BAND_TINT_OPACITY: f32 = 0.1;

/// Page number font size in points
pub const DEFAULT_PAGE_NUMBER_FONT_SIZE: f32 = 8.0;

/// Separator line thickness under line items, in points
pub const DEFAULT_SEPARATOR_THICKNESS: f32 = 0.5;

/// Timeout for the remote compliance service, in seconds
pub const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 30;
