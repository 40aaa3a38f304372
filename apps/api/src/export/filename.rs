const DEFAULT_FILENAME: &str = "Cover_Letter.pdf";

/// `Cover_Letter_<Company>.pdf` with every non-alphanumeric character of the
/// company name removed, or `Cover_Letter.pdf` when nothing remains.
pub fn export_filename(company_name: &str) -> String {
    let sanitized: String = company_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if sanitized.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("Cover_Letter_{sanitized}.pdf")
    }
}
