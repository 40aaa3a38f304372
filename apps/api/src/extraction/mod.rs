//! Resume extraction — turns an uploaded PDF or DOCX into plain text.
//!
//! Parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`. A
//! panic inside a parser surfaces as `ExtractionError::Parse`, not a crash.

pub mod docx;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type. Please upload a PDF or DOCX file.")]
    UnsupportedFileType(String),

    #[error("Failed to parse file: {0}")]
    Parse(String),

    #[error("No file was uploaded.")]
    MissingFile,
}

/// Supported resume document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
}

impl ResumeFormat {
    /// Picks the format from the declared content type, falling back to the
    /// file extension when the type is absent or generic.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self, ExtractionError> {
        let mime = content_type
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());

        match mime.as_deref() {
            Some(PDF_MIME) => return Ok(ResumeFormat::Pdf),
            Some(DOCX_MIME) => return Ok(ResumeFormat::Docx),
            Some(m) if m != "application/octet-stream" => {
                return Err(ExtractionError::UnsupportedFileType(m.to_string()))
            }
            _ => {}
        }

        let ext = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(ResumeFormat::Pdf),
            Some("docx") => Ok(ResumeFormat::Docx),
            _ => Err(ExtractionError::UnsupportedFileType(
                mime.unwrap_or_else(|| "unknown".to_string()),
            )),
        }
    }
}

/// Extracts plain text from a resume document.
pub async fn extract_resume_text(format: ResumeFormat, data: Bytes) -> Result<String, ExtractionError> {
    let size = data.len();
    let text = tokio::task::spawn_blocking(move || match format {
        ResumeFormat::Pdf => pdf::extract_text(&data),
        ResumeFormat::Docx => docx::extract_text(&data),
    })
    .await
    .map_err(|e| ExtractionError::Parse(format!("parser aborted: {e}")))??;

    info!("Extracted {} chars from {size}-byte {:?} resume", text.len(), format);
    Ok(text)
}
