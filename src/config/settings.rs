use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::model::DocumentData;
use crate::render::helpers::colors::parse_hex_color;

use super::defaults::*;

/// Runtime settings for PDF generation
#[derive(Debug, Clone)]
pub struct Settings {
    // Page dimensions (mm)
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub pagination_band_height: f32,

    // Packing
    pub section_spacing: f32,
    pub item_spacing: f32,
    pub min_split_space: f32,
    /// Reject sections taller than a page instead of overflowing
    pub strict_layout: bool,

    // Appearance
    pub brand_color: (u8, u8, u8),
    /// Brand color from the CLI, wins over the document's own color
    brand_color_override: Option<(u8, u8, u8)>,
    /// Brand color from the document appearance
    pub brand_color_from_document: Option<(u8, u8, u8)>,
    pub band_tint_opacity: f32,
    pub page_number_font_size: f32,
    pub separator_thickness: f32,
    pub compress: bool,

    // Compliance
    pub facturx_enabled: bool,
    pub embed_url: Option<String>,
    pub embed_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            margin_top: DEFAULT_MARGIN_TOP,
            margin_left: DEFAULT_MARGIN_SIDE,
            margin_right: DEFAULT_MARGIN_SIDE,
            pagination_band_height: DEFAULT_PAGINATION_BAND_HEIGHT,

            section_spacing: DEFAULT_SECTION_SPACING,
            item_spacing: DEFAULT_ITEM_SPACING,
            min_split_space: DEFAULT_MIN_SPLIT_SPACE,
            strict_layout: false,

            brand_color: DEFAULT_BRAND_COLOR,
            brand_color_override: None,
            brand_color_from_document: None,
            band_tint_opacity: DEFAULT_BAND_TINT_OPACITY,
            page_number_font_size: DEFAULT_PAGE_NUMBER_FONT_SIZE,
            separator_thickness: DEFAULT_SEPARATOR_THICKNESS,
            compress: true,

            facturx_enabled: true,
            embed_url: None,
            embed_timeout_secs: DEFAULT_EMBED_TIMEOUT_SECS,
        }
    }
}

/// On-disk configuration, every key optional
///
/// ```toml
/// [layout]
/// margin_top = 10.0
/// item_spacing = 0.5
///
/// [appearance]
/// brand_color = "#5B4FFF"
///
/// [compliance]
/// enabled = true
/// embed_url = "https://example.com/api/generate-facturx"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub layout: LayoutSection,
    pub appearance: AppearanceSection,
    pub compliance: ComplianceSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
    pub page_width: Option<f32>,
    pub page_height: Option<f32>,
    pub margin_top: Option<f32>,
    pub margin_left: Option<f32>,
    pub margin_right: Option<f32>,
    pub pagination_band_height: Option<f32>,
    pub section_spacing: Option<f32>,
    pub item_spacing: Option<f32>,
    pub min_split_space: Option<f32>,
    pub strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppearanceSection {
    pub brand_color: Option<String>,
    pub band_tint_opacity: Option<f32>,
    pub page_number_font_size: Option<f32>,
    pub compress: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComplianceSection {
    pub enabled: Option<bool>,
    pub embed_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }
}

impl Settings {
    /// Create settings from CLI arguments, layering an optional config file underneath
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut settings = match args.config {
            Some(ref path) => Self::default().with_file(&ConfigFile::load(path)?)?,
            None => Self::default(),
        };

        if let Some(ref hex) = args.brand_color {
            settings = settings.with_brand_color_override(parse_hex_color(hex)?);
        }
        if !args.facturx_enabled() {
            settings.facturx_enabled = false;
        }
        if args.embed_url.is_some() {
            settings.embed_url = args.embed_url.clone();
        }
        if args.strict_layout {
            settings.strict_layout = true;
        }
        if args.no_compress {
            settings.compress = false;
        }

        Ok(settings)
    }

    /// Apply values from a config file
    pub fn with_file(mut self, file: &ConfigFile) -> Result<Self, ConfigError> {
        let layout = &file.layout;
        let set = |target: &mut f32, value: Option<f32>| {
            if let Some(v) = value {
                *target = v;
            }
        };
        set(&mut self.page_width, layout.page_width);
        set(&mut self.page_height, layout.page_height);
        set(&mut self.margin_top, layout.margin_top);
        set(&mut self.margin_left, layout.margin_left);
        set(&mut self.margin_right, layout.margin_right);
        set(&mut self.pagination_band_height, layout.pagination_band_height);
        set(&mut self.section_spacing, layout.section_spacing);
        set(&mut self.item_spacing, layout.item_spacing);
        set(&mut self.min_split_space, layout.min_split_space);
        if let Some(strict) = layout.strict {
            self.strict_layout = strict;
        }

        let appearance = &file.appearance;
        if let Some(ref hex) = appearance.brand_color {
            self.brand_color = parse_hex_color(hex)?;
        }
        set(&mut self.band_tint_opacity, appearance.band_tint_opacity);
        set(&mut self.page_number_font_size, appearance.page_number_font_size);
        if let Some(compress) = appearance.compress {
            self.compress = compress;
        }

        let compliance = &file.compliance;
        if let Some(enabled) = compliance.enabled {
            self.facturx_enabled = enabled;
        }
        if compliance.embed_url.is_some() {
            self.embed_url = compliance.embed_url.clone();
        }
        if let Some(timeout) = compliance.timeout_secs {
            self.embed_timeout_secs = timeout;
        }

        Ok(self)
    }

    /// Merge with document data (its appearance color overrides the configured default)
    pub fn with_document(mut self, data: &DocumentData) -> Self {
        self.brand_color_from_document = match data.brand_color().map(parse_hex_color) {
            Some(Ok(color)) => Some(color),
            Some(Err(e)) => {
                log::warn!("Ignoring document brand color: {}", e);
                None
            }
            None => None,
        };
        self
    }

    /// Set the brand color as if given on the command line
    pub fn with_brand_color_override(mut self, color: (u8, u8, u8)) -> Self {
        self.brand_color_override = Some(color);
        self
    }

    /// Get the brand color to use: CLI, then document, then configured default
    pub fn effective_brand_color(&self) -> (u8, u8, u8) {
        self.brand_color_override
            .or(self.brand_color_from_document)
            .unwrap_or(self.brand_color)
    }

    /// Get the usable content width between the side margins
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Get the height available to sections on one page
    pub fn available_height(&self) -> f32 {
        self.page_height - self.margin_top - self.pagination_band_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let settings = Settings::default();
        assert!((settings.available_height() - 275.0).abs() < 0.001);
        assert!((settings.content_width() - 184.0).abs() < 0.001);
        assert_eq!(settings.effective_brand_color(), (0x5B, 0x4F, 0xFF));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = ConfigFile::parse(
            r##"
            [layout]
            margin_top = 15.0
            strict = true

            [appearance]
            brand_color = "#000000"

            [compliance]
            enabled = false
            "##,
            "test.toml",
        )
        .unwrap();
        let settings = Settings::default().with_file(&file).unwrap();
        assert_eq!(settings.margin_top, 15.0);
        assert!(settings.strict_layout);
        assert!(!settings.facturx_enabled);
        assert_eq!(settings.effective_brand_color(), (0, 0, 0));
        assert_eq!(settings.item_spacing, DEFAULT_ITEM_SPACING);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ConfigFile::parse("[layout]\nmargin_bottom = 3.0\n", "test.toml");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_brand_color_precedence() {
        let data = DocumentData {
            appearance: Some(crate::model::Appearance {
                primary_color: Some("#102030".to_string()),
            }),
            ..Default::default()
        };
        let settings = Settings::default().with_document(&data);
        assert_eq!(settings.effective_brand_color(), (0x10, 0x20, 0x30));

        let settings = settings.with_brand_color_override((1, 2, 3));
        assert_eq!(settings.effective_brand_color(), (1, 2, 3));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        use clap::Parser;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"
            [layout]
            margin_top = 12.0
            strict = false

            [appearance]
            brand_color = "#AABBCC"

            [compliance]
            enabled = true
            "##
        )
        .unwrap();

        let args = Args::parse_from([
            "invoice-pdf",
            "--data",
            "inv.json",
            "--sections",
            "out",
            "--config",
            file.path().to_str().unwrap(),
            "--brand-color",
            "#010203",
            "--strict-layout",
            "--no-facturx",
        ]);
        let data = DocumentData {
            appearance: Some(crate::model::Appearance {
                primary_color: Some("#102030".to_string()),
            }),
            ..Default::default()
        };
        let settings = Settings::from_args(&args).unwrap().with_document(&data);

        assert_eq!(settings.effective_brand_color(), (1, 2, 3));
        assert!(settings.strict_layout);
        assert!(!settings.facturx_enabled);
        assert_eq!(settings.margin_top, 12.0);
        assert_eq!(settings.brand_color, (0xAA, 0xBB, 0xCC));
        assert!(settings.compress);
    }

    #[test]
    fn test_invalid_document_color_ignored() {
        let data = DocumentData {
            appearance: Some(crate::model::Appearance {
                primary_color: Some("blue".to_string()),
            }),
            ..Default::default()
        };
        let settings = Settings::default().with_document(&data);
        assert_eq!(settings.effective_brand_color(), DEFAULT_BRAND_COLOR);
    }
}
