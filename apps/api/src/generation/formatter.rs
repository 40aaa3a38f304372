//! AI resume formatting — restructures extracted resume text into
//! `--- Section ---` headed blocks with hyphen bullets.
//!
//! Never fails: on any model error or empty reply the raw text is returned
//! along with a notice for the user.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::RESUME_FORMAT_PROMPT;
use crate::generation::resolver::FAST_MODEL;
use crate::llm_client::{LanguageModel, LlmError, ModelCall};

pub const FORMAT_FALLBACK_NOTICE: &str = "Could not format resume text, using raw text.";

#[derive(Debug, Error)]
enum FormattingError {
    #[error("formatting call failed: {0}")]
    Model(#[from] LlmError),

    #[error("formatting call returned no text")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedResume {
    pub text: String,
    /// Set when formatting failed and the raw text was kept.
    pub notice: Option<String>,
}

pub async fn format_resume_text(llm: &dyn LanguageModel, raw_text: &str) -> FormattedResume {
    if raw_text.trim().is_empty() {
        return FormattedResume {
            text: String::new(),
            notice: None,
        };
    }

    match request_formatting(llm, raw_text).await {
        Ok(text) => {
            info!("Resume formatted: {} -> {} chars", raw_text.len(), text.len());
            FormattedResume { text, notice: None }
        }
        Err(e) => {
            warn!("Resume formatting failed, falling back to raw text: {e}");
            FormattedResume {
                text: raw_text.to_string(),
                notice: Some(FORMAT_FALLBACK_NOTICE.to_string()),
            }
        }
    }
}

async fn request_formatting(
    llm: &dyn LanguageModel,
    raw_text: &str,
) -> Result<String, FormattingError> {
    let prompt = RESUME_FORMAT_PROMPT.replacen("{raw_text}", raw_text, 1);
    let reply = llm.generate(&ModelCall::plain(FAST_MODEL, &prompt)).await?;
    reply
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or(FormattingError::Empty)
}
