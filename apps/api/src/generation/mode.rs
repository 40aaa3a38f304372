//! Job-input variants and generation modes, plus the one rule that ties them
//! together: a URL job input always runs with search grounding.

use serde::{Deserialize, Serialize};

/// Which job-input tab is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobInputKind {
    #[default]
    Text,
    Url,
}

/// The active job input with its value. Exactly one variant at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobInput<'a> {
    Text(&'a str),
    Url(&'a str),
}

impl<'a> JobInput<'a> {
    pub fn kind(&self) -> JobInputKind {
        match self {
            JobInput::Text(_) => JobInputKind::Text,
            JobInput::Url(_) => JobInputKind::Url,
        }
    }

    pub fn value(&self) -> &'a str {
        match *self {
            JobInput::Text(v) | JobInput::Url(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    #[default]
    Standard,
    Thinking,
    LowLatency,
    SearchGrounding,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 4] = [
        GenerationMode::Standard,
        GenerationMode::Thinking,
        GenerationMode::LowLatency,
        GenerationMode::SearchGrounding,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GenerationMode::Standard => "Standard",
            GenerationMode::Thinking => "Thinking Mode",
            GenerationMode::LowLatency => "Low Latency",
            GenerationMode::SearchGrounding => "Search Grounding",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GenerationMode::Standard => {
                "Balanced approach using the high-quality model for polished results."
            }
            GenerationMode::Thinking => {
                "Engages deep reasoning with a large thinking budget for complex roles."
            }
            GenerationMode::LowLatency => {
                "Uses a lightweight model for the fastest possible responses."
            }
            GenerationMode::SearchGrounding => {
                "Connects to web search for up-to-date, factual information."
            }
        }
    }
}

/// Shown in place of the mode description while a job URL forces the mode.
pub const URL_MODE_LOCK_NOTICE: &str = "Search Grounding mode is required when using a job URL.";

/// The mode a request actually runs with.
///
/// Used by both the session view (to lock the selector) and the resolver, so
/// the two can never disagree.
pub fn effective_mode(kind: JobInputKind, selected: GenerationMode) -> GenerationMode {
    match kind {
        JobInputKind::Url => GenerationMode::SearchGrounding,
        JobInputKind::Text => selected,
    }
}
