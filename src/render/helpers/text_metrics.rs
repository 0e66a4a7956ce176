//! Text measurement for the Helvetica builtin font
//!
//! Used to right-align and vertically center the page numbers in the
//! pagination band. Widths come from Adobe's AFM files, 1000 units per em.

/// Points to millimeters
const PT_TO_MM: f32 = 0.3528;

/// Text measurer for the Helvetica builtin font
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFontMeasurer;

impl BuiltinFontMeasurer {
    /// Get character width in 1000 units per em
    fn char_width(&self, c: char) -> u16 {
        // Builtin fonts are Win-1252; anything outside ASCII gets an average width
        if !c.is_ascii() {
            return 556;
        }
        HELVETICA_WIDTHS[c as usize]
    }

    /// Measure text width in points
    pub fn measure_width_pt(&self, text: &str, font_size: f32) -> f32 {
        let total_width: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        (total_width as f32 / 1000.0) * font_size
    }

    /// Measure text width in mm
    pub fn measure_width_mm(&self, text: &str, font_size: f32) -> f32 {
        self.measure_width_pt(text, font_size) * PT_TO_MM
    }

    /// Cap height in mm
    pub fn cap_height_mm(&self, font_size: f32) -> f32 {
        (718.0 / 1000.0) * font_size * PT_TO_MM
    }
}

/// Get a builtin font measurer for Helvetica (sans-serif regular)
pub fn get_helvetica_measurer() -> &'static BuiltinFontMeasurer {
    static MEASURER: BuiltinFontMeasurer = BuiltinFontMeasurer;
    &MEASURER
}

/// Helvetica character widths
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
];
