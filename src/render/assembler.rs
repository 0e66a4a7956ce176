use image::DynamicImage;
use printpdf::{
    BuiltinFont, Color, Mm, PaintMode, PdfDocument, PdfPage, PdfSaveOptions, XObjectId,
};
use std::collections::HashMap;

use crate::capture::{Rasterizer, SectionSet};
use crate::config::Settings;
use crate::error::RenderError;
use crate::model::{Page, PlacedSection, SectionKind};

use super::helpers::colors::{band_color, SEPARATOR_GRAY, TEXT_GRAY};
use super::helpers::{
    compress_pdf, get_helvetica_measurer, placement_transform, to_raw_image, LayerBuilder,
};

/// Draws packed pages into a PDF
pub struct DocumentAssembler<'a, R: Rasterizer + ?Sized> {
    settings: &'a Settings,
    rasterizer: &'a R,
}

impl<'a, R: Rasterizer + ?Sized> DocumentAssembler<'a, R> {
    pub fn new(settings: &'a Settings, rasterizer: &'a R) -> Self {
        Self {
            settings,
            rasterizer,
        }
    }

    /// Render `pages` to PDF bytes
    ///
    /// Any failure aborts the whole document; no partial output is returned.
    pub fn assemble(
        &self,
        pages: &[Page],
        sections: &SectionSet,
        title: &str,
    ) -> Result<Vec<u8>, RenderError> {
        if pages.is_empty() {
            return Err(RenderError::PdfGeneration("no pages to render".to_string()));
        }

        let mut doc = PdfDocument::new(title);
        let total = pages.len();
        let mut pdf_pages = Vec::with_capacity(total);
        // Whole-section images are embedded once and reused on every page
        let mut images: HashMap<SectionKind, XObjectId> = HashMap::new();

        for page in pages {
            let mut layer = LayerBuilder::new();

            for placed in &page.sections {
                // The footer is pinned above the band of the last page instead
                if placed.kind == SectionKind::Footer {
                    continue;
                }
                self.draw_section(&mut doc, &mut images, &mut layer, placed, sections)?;
            }

            if page.number == total {
                self.draw_footer(&mut doc, &mut images, &mut layer, sections)?;
            }

            self.draw_pagination_band(&mut layer, page.number, total);

            pdf_pages.push(PdfPage::new(
                Mm(self.settings.page_width),
                Mm(self.settings.page_height),
                layer.into_ops(),
            ));
        }

        doc.with_pages(pdf_pages);

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        log::debug!("Saved {} pages ({} bytes, {} warnings)", total, bytes.len(), warnings.len());

        if self.settings.compress {
            compress_pdf(bytes)
        } else {
            Ok(bytes)
        }
    }

    fn draw_section(
        &self,
        doc: &mut PdfDocument,
        images: &mut HashMap<SectionKind, XObjectId>,
        layer: &mut LayerBuilder,
        placed: &PlacedSection,
        sections: &SectionSet,
    ) -> Result<(), RenderError> {
        let source = sections
            .image(placed.kind)
            .ok_or(RenderError::MissingImage(placed.kind))?;

        let (id, pixels) = match placed.partial {
            Some(slice) => {
                let converter = sections.converter();
                let start_px = (converter.mm_to_px(slice.start_mm).round() as u32)
                    .min(source.height().saturating_sub(1));
                let end_px = (converter.mm_to_px(slice.start_mm + slice.height_mm).round() as u32)
                    .min(source.height())
                    .max(start_px + 1);
                let cropped = self.rasterizer.crop(source, start_px, end_px - start_px)?;
                (doc.add_image(&to_raw_image(&cropped)), (cropped.width(), cropped.height()))
            }
            None => (
                cached_image(doc, images, placed.kind, source),
                (source.width(), source.height()),
            ),
        };

        let (x, width) = if placed.full_width {
            (0.0, self.settings.page_width)
        } else {
            (self.settings.margin_left, self.settings.content_width())
        };
        let top = self.settings.margin_top + placed.y_mm;
        let bottom = self.settings.page_height - top - placed.height_mm;

        let transform = placement_transform(pixels.0, pixels.1, x, bottom, width, placed.height_mm);
        layer.use_xobject(id, transform);

        if placed.kind.is_item() {
            let line_y = bottom - self.settings.item_spacing / 2.0;
            layer.set_outline_color(Color::Rgb(SEPARATOR_GRAY));
            layer.set_outline_thickness(self.settings.separator_thickness);
            layer.add_line(
                Mm(self.settings.margin_left),
                Mm(line_y),
                Mm(self.settings.page_width - self.settings.margin_right),
                Mm(line_y),
            );
        }

        Ok(())
    }

    fn draw_footer(
        &self,
        doc: &mut PdfDocument,
        images: &mut HashMap<SectionKind, XObjectId>,
        layer: &mut LayerBuilder,
        sections: &SectionSet,
    ) -> Result<(), RenderError> {
        let Some(footer) = sections
            .sections()
            .iter()
            .find(|s| s.kind == SectionKind::Footer)
        else {
            return Ok(());
        };
        let image = sections
            .image(SectionKind::Footer)
            .ok_or(RenderError::MissingImage(SectionKind::Footer))?;

        let id = cached_image(doc, images, SectionKind::Footer, image);
        let transform = placement_transform(
            image.width(),
            image.height(),
            self.settings.margin_left,
            self.settings.pagination_band_height,
            self.settings.content_width(),
            footer.height_mm,
        );
        layer.use_xobject(id, transform);
        Ok(())
    }

    /// Tinted band at the bottom of the page with "Page X / N" on the right
    fn draw_pagination_band(&self, layer: &mut LayerBuilder, number: usize, total: usize) {
        let band_height = self.settings.pagination_band_height;
        let page_width = self.settings.page_width;

        layer.save_graphics_state();
        layer.set_fill_color(Color::Rgb(band_color(
            self.settings.effective_brand_color(),
            self.settings.band_tint_opacity,
        )));
        layer.add_rect(Mm(0.0), Mm(0.0), Mm(page_width), Mm(band_height), PaintMode::Fill);

        let label = page_label(number, total);
        let font_size = self.settings.page_number_font_size;
        let measurer = get_helvetica_measurer();
        let text_x = page_width - self.settings.margin_right - measurer.measure_width_mm(&label, font_size);
        let text_y = (band_height - measurer.cap_height_mm(font_size)) / 2.0;

        layer.set_fill_color(Color::Rgb(TEXT_GRAY));
        layer.use_text(label, font_size, Mm(text_x), Mm(text_y), BuiltinFont::Helvetica);
        layer.restore_graphics_state();
    }
}

fn cached_image(
    doc: &mut PdfDocument,
    images: &mut HashMap<SectionKind, XObjectId>,
    kind: SectionKind,
    image: &DynamicImage,
) -> XObjectId {
    images
        .entry(kind)
        .or_insert_with(|| doc.add_image(&to_raw_image(image)))
        .clone()
}

/// Text shown in the pagination band
pub fn page_label(number: usize, total: usize) -> String {
    format!("Page {} / {}", number, total)
}
