// PDF export of a finished cover letter.
// Layout is a greedy word wrap over static Helvetica metrics; pages are added
// as the text flow requires.

pub mod filename;
pub mod font_metrics;
pub mod pdf;

use thiserror::Error;

pub use filename::export_filename;
pub use pdf::render_cover_letter_pdf;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}
