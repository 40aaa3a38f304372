use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

use super::font_metrics::{layout_lines, PageConfig};
use super::ExportError;

/// Renders a cover letter to PDF bytes using the built-in Helvetica font.
pub fn render_cover_letter_pdf(text: &str, title: &str) -> Result<Vec<u8>, ExportError> {
    let config = PageConfig::default();
    let lines = layout_lines(&to_builtin_charset(text), &config);
    let per_page = config.lines_per_page();

    let width = Mm(config.page_width_mm);
    let height = Mm(config.page_height_mm);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Letter");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let top_baseline = config.page_height_mm - config.margin_mm - config.font_size_mm();
    let mut page_count = 0;

    for (index, page_lines) in lines.chunks(per_page).enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(width, height, "Letter");
            doc.get_page(page).get_layer(layer)
        };
        page_count += 1;

        for (row, line) in page_lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = top_baseline - row as f32 * config.line_height_mm();
            layer.use_text(
                line.as_str(),
                config.font_size_pt,
                Mm(config.margin_mm),
                Mm(y),
                &font,
            );
        }
    }

    debug!("Rendered {} lines over {} pages", lines.len(), page_count.max(1));

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Maps text onto what the built-in font can show: ASCII and Latin-1 pass
/// through, common typographic punctuation is transliterated, anything else
/// becomes `?`.
fn to_builtin_charset(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{2023}' | '\u{25CF}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2002}'..='\u{200A}' => out.push(' '),
            '\t' => out.push_str("    "),
            '\n' | '\r' => out.push(c),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if ('\u{00A1}'..='\u{00FF}').contains(&c) => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
