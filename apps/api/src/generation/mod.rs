// Cover letter generation.
// Implements: mode rules, tone, prompt templates, request resolution, the
// generation client, and AI resume formatting.
// All model calls go through llm_client — no direct API calls here.

pub mod formatter;
pub mod generator;
pub mod mode;
pub mod prompts;
pub mod resolver;
pub mod tone;
