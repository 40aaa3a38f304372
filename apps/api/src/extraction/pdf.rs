use super::ExtractionError;

/// Extracts text from every page. pdf-extract separates pages with form feeds;
/// they are turned into blank lines.
pub fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    let raw = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| ExtractionError::Parse(format!("PDF parse error: {e}")))?;

    let pages: Vec<&str> = raw
        .split('\u{c}')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    Ok(pages.join("\n\n"))
}
