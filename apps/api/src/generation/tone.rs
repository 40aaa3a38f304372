//! Tone selection — a purely textual modifier injected into the prompt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Enthusiastic,
    Confident,
    Creative,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Professional,
        Tone::Enthusiastic,
        Tone::Confident,
        Tone::Creative,
    ];

    /// The instruction sentence substituted into the prompt's `{tone}` slot.
    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => {
                "Maintain a professional, confident, and enthusiastic tone throughout."
            }
            Tone::Enthusiastic => {
                "Write with genuine energy and excitement about the role and the company, \
                while staying professional."
            }
            Tone::Confident => {
                "Write assertively. Lead with concrete achievements and avoid hedging \
                phrases such as \"I believe\" or \"I feel\"."
            }
            Tone::Creative => {
                "Use a distinctive, memorable voice with an engaging opening line, \
                while keeping the letter focused on the role."
            }
        }
    }
}
