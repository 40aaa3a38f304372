/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// All model interactions go through the `LanguageModel` trait defined here.
///
/// One call per invocation. No retries, no backoff, no caching: a second
/// identical call is a fully independent attempt.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response was blocked: {0}")]
    Blocked(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Call / reply types (provider-neutral)
// ────────────────────────────────────────────────────────────────────────────

/// One model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCall<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    /// Extended reasoning token budget, when enabled.
    pub thinking_budget: Option<u32>,
    /// Attach the web search tool.
    pub web_search: bool,
}

impl<'a> ModelCall<'a> {
    /// A plain text call with no auxiliary features.
    pub fn plain(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            thinking_budget: None,
            web_search: false,
        }
    }
}

/// A web citation attached to a reply when search was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    /// Concatenated answer text. `None` when the model produced no text.
    pub text: Option<String>,
    pub citations: Vec<Citation>,
}

/// The model seam. `AppState` carries an `Arc<dyn LanguageModel>` so tests
/// can substitute a fake without touching handlers or the controller.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, call: &ModelCall<'_>) -> Result<ModelReply, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: EmptyObject,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiResponse {
    fn into_reply(self) -> ModelReply {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelReply::default();
        };

        let text: String = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .map(|m| {
                m.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .map(|web| Citation {
                        uri: web.uri,
                        title: web.title,
                    })
                    .collect()
            })
            .unwrap_or_default();

        ModelReply {
            text: if text.is_empty() { None } else { Some(text) },
            citations,
        }
    }
}

fn build_request<'a>(call: &ModelCall<'a>) -> GeminiRequest<'a> {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts: vec![GeminiPart { text: call.prompt }],
        }],
        generation_config: call.thinking_budget.map(|budget| GenerationConfig {
            thinking_config: ThinkingConfig {
                thinking_budget: budget,
            },
        }),
        tools: if call.web_search {
            vec![GeminiTool {
                google_search: EmptyObject {},
            }]
        } else {
            Vec::new()
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The Gemini client used by all services.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// `base_url` is the API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, call: &ModelCall<'_>) -> Result<ModelReply, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, call.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(call))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response.json().await?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked(reason));
        }

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
                call.model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed.into_reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key".to_string(), server.uri())
    }

    #[test]
    fn test_plain_request_has_no_config_or_tools() {
        let call = ModelCall::plain("gemini-2.5-pro", "hello");
        let value = serde_json::to_value(build_request(&call)).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert!(value.get("generationConfig").is_none());
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_thinking_budget_serializes_camel_case() {
        let call = ModelCall {
            thinking_budget: Some(32768),
            ..ModelCall::plain("gemini-2.5-pro", "hello")
        };
        let value = serde_json::to_value(build_request(&call)).unwrap();
        assert_eq!(
            value["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            32768
        );
    }

    #[test]
    fn test_web_search_adds_google_search_tool() {
        let call = ModelCall {
            web_search: true,
            ..ModelCall::plain("gemini-2.5-flash", "hello")
        };
        let value = serde_json::to_value(build_request(&call)).unwrap();
        assert_eq!(value["tools"], json!([{ "google_search": {} }]));
    }

    #[test]
    fn test_reply_skips_thought_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "reasoning...", "thought": true },
                    { "text": "Dear " },
                    { "text": "Hiring Manager" }
                ]}
            }]
        }))
        .unwrap();
        assert_eq!(response.into_reply().text.as_deref(), Some("Dear Hiring Manager"));
    }

    #[test]
    fn test_reply_without_candidates_is_empty() {
        let response: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.into_reply(), ModelReply::default());
    }

    #[tokio::test]
    async fn test_generate_returns_text_and_citations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({ "tools": [{ "google_search": {} }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Dear team," }] },
                    "groundingMetadata": { "groundingChunks": [
                        { "web": { "uri": "https://example.com/job", "title": "Job" } }
                    ]}
                }],
                "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 3 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let call = ModelCall {
            web_search: true,
            ..ModelCall::plain("gemini-2.5-flash", "write")
        };
        let reply = client_for(&server).generate(&call).await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("Dear team,"));
        assert_eq!(
            reply.citations,
            vec![Citation {
                uri: Some("https://example.com/job".into()),
                title: Some("Job".into()),
            }]
        );
    }

    #[tokio::test]
    async fn test_api_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": { "message": "overloaded" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&ModelCall::plain("gemini-2.5-pro", "write"))
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&ModelCall::plain("gemini-2.5-pro", "write"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Blocked(reason) if reason == "SAFETY"));
    }
}
