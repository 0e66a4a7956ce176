use printpdf::Rgb;

use crate::error::ConfigError;

/// Separator line under line items
pub const SEPARATOR_GRAY: Rgb = Rgb {
    r: 0.898,
    g: 0.906,
    b: 0.922,
    icc_profile: None,
};

/// Page number text
pub const TEXT_GRAY: Rgb = Rgb {
    r: 0.4,
    g: 0.4,
    b: 0.4,
    icc_profile: None,
};

/// Parse `#RRGGBB`, `RRGGBB` or `#RGB`
pub fn parse_hex_color(value: &str) -> Result<(u8, u8, u8), ConfigError> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || ConfigError::InvalidColor(value.to_string());

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            Ok((channel(0)?, channel(2)?, channel(4)?))
        }
        3 => {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 1], 16)
                    .map(|v| v * 17)
                    .map_err(|_| invalid())
            };
            Ok((channel(0)?, channel(1)?, channel(2)?))
        }
        _ => Err(invalid()),
    }
}

/// Blend `color` at `opacity` over white, channels in 0.0-1.0
pub fn tint_over_white(color: (u8, u8, u8), opacity: f32) -> (f32, f32, f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    let blend = |c: u8| (c as f32 / 255.0) * opacity + (1.0 - opacity);
    (blend(color.0), blend(color.1), blend(color.2))
}

/// Background of the pagination band
pub fn band_color(brand: (u8, u8, u8), opacity: f32) -> Rgb {
    let (r, g, b) = tint_over_white(brand, opacity);
    Rgb::new(r, g, b, None)
}
