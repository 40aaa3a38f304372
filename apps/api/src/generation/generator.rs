//! Generation client — executes one resolved request and normalises the outcome.
//!
//! Every failure (transport, auth, service, blocked, empty text) collapses to
//! `AppError::GenerationFailed` with a message safe to show the user. The
//! underlying error is logged, never inspected further. No retries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::resolver::GenerationRequest;
use crate::llm_client::{Citation, LanguageModel};

pub const SERVICE_FAILURE_MESSAGE: &str =
    "Failed to communicate with the Gemini API. Please check your connection or API key.";
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "The model returned an empty response. Please try again.";

/// A web citation returned when search grounding was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub text: String,
    /// Deduplicated by uri, in first-seen order. May be empty.
    pub sources: Vec<GroundingSource>,
}

/// Runs one generation attempt: exactly one model call.
pub async fn generate_cover_letter(
    llm: &dyn LanguageModel,
    request: &GenerationRequest,
) -> Result<GenerationResult, AppError> {
    info!(
        "Generating cover letter: model={}, features={:?}",
        request.model_id(),
        request.features()
    );

    let reply = llm.generate(&request.as_model_call()).await.map_err(|e| {
        error!("Error calling Gemini API: {e}");
        AppError::GenerationFailed(SERVICE_FAILURE_MESSAGE.to_string())
    })?;

    let text = reply
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::GenerationFailed(EMPTY_RESPONSE_MESSAGE.to_string()))?;

    let sources = if request.has_web_search() {
        dedup_sources(reply.citations)
    } else {
        Vec::new()
    };

    info!(
        "Cover letter generated: {} chars, {} sources",
        text.len(),
        sources.len()
    );

    Ok(GenerationResult { text, sources })
}

/// Drops citations without a uri, fills missing titles with the uri, and
/// keeps only the first citation per uri.
fn dedup_sources(citations: Vec<Citation>) -> Vec<GroundingSource> {
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .filter_map(|c| {
            let uri = c.uri.filter(|u| !u.trim().is_empty())?;
            let title = c
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| uri.clone());
            Some(GroundingSource { uri, title })
        })
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}
