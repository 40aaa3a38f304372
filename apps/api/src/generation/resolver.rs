//! Generation request resolver — maps (job input, selected mode, tone, resume)
//! to one concrete model request.
//!
//! Pure: no I/O, no hidden state. Inputs are assumed valid; the session
//! validates before calling in.

use serde::Serialize;

use crate::generation::mode::{effective_mode, GenerationMode, JobInput};
use crate::generation::prompts::{COVER_LETTER_FROM_TEXT, COVER_LETTER_FROM_URL};
use crate::generation::tone::Tone;
use crate::llm_client::ModelCall;

/// High-quality model used for standard and thinking modes.
pub const BASE_MODEL: &str = "gemini-2.5-pro";
/// Lightweight model for low-latency mode.
pub const LITE_MODEL: &str = "gemini-2.5-flash-lite";
/// Fast model used with the search tool.
pub const FAST_MODEL: &str = "gemini-2.5-flash";
/// Reasoning budget for thinking mode.
pub const THINKING_BUDGET: u32 = 32768;

/// An auxiliary model feature enabled on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Feature {
    ExtendedReasoning { budget: u32 },
    WebSearch,
}

/// A fully resolved request. Built fresh per attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    model_id: &'static str,
    features: Vec<Feature>,
    prompt_text: String,
}

impl GenerationRequest {
    pub fn model_id(&self) -> &'static str {
        self.model_id
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn has_web_search(&self) -> bool {
        self.features.contains(&Feature::WebSearch)
    }

    pub fn thinking_budget(&self) -> Option<u32> {
        self.features.iter().find_map(|f| match f {
            Feature::ExtendedReasoning { budget } => Some(*budget),
            Feature::WebSearch => None,
        })
    }

    /// Borrows this request as a provider call.
    pub fn as_model_call(&self) -> ModelCall<'_> {
        ModelCall {
            model: self.model_id,
            prompt: &self.prompt_text,
            thinking_budget: self.thinking_budget(),
            web_search: self.has_web_search(),
        }
    }
}

/// Model id and features for an effective mode.
fn model_for(mode: GenerationMode) -> (&'static str, Vec<Feature>) {
    match mode {
        GenerationMode::Standard => (BASE_MODEL, vec![]),
        GenerationMode::Thinking => (
            BASE_MODEL,
            vec![Feature::ExtendedReasoning {
                budget: THINKING_BUDGET,
            }],
        ),
        GenerationMode::LowLatency => (LITE_MODEL, vec![]),
        GenerationMode::SearchGrounding => (FAST_MODEL, vec![Feature::WebSearch]),
    }
}

/// Fills the template for the job input variant.
///
/// Order is tone, then resume, then the job value; user text is inserted verbatim.
fn build_prompt(job_input: JobInput<'_>, tone: Tone, resume: &str) -> String {
    match job_input {
        JobInput::Text(description) => COVER_LETTER_FROM_TEXT
            .replacen("{tone}", tone.instruction(), 1)
            .replacen("{resume}", resume, 1)
            .replacen("{job_description}", description, 1),
        JobInput::Url(url) => COVER_LETTER_FROM_URL
            .replacen("{tone}", tone.instruction(), 1)
            .replacen("{resume}", resume, 1)
            .replacen("{job_url}", url, 1),
    }
}

/// Resolves one request. Applies the URL → search grounding override itself
/// so callers cannot bypass it.
pub fn resolve_request(
    job_input: JobInput<'_>,
    selected_mode: GenerationMode,
    tone: Tone,
    resume: &str,
) -> GenerationRequest {
    let mode = effective_mode(job_input.kind(), selected_mode);
    let (model_id, features) = model_for(mode);

    GenerationRequest {
        model_id,
        features,
        prompt_text: build_prompt(job_input, tone, resume),
    }
}
