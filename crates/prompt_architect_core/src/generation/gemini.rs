//! Gemini `generateContent` REST client.
//!
//! # Responsibility
//! - Translate boundary operations into single blocking HTTP requests.
//! - Shape model replies into typed results.
//!
//! # Invariants
//! - The API key is sent as a header and never logged.
//! - Raw reply bodies are never surfaced in errors.

use super::config::GenerationConfig;
use super::response::parse_json;
use super::{
    Distillation, GeneratedPrompt, GenerationError, GenerationOperation, GenerationProvider,
    GenerationResult,
};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Blocking Gemini client.
pub struct GeminiClient {
    endpoint: String,
    model: String,
    suggestion_model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    /// - [`GenerationError::MissingCredential`] when no key is configured.
    /// - [`GenerationError::Config`] for invalid endpoint/model settings.
    /// - [`GenerationError::ClientSetup`] when the HTTP client cannot be built.
    pub fn from_config(config: &GenerationConfig) -> GenerationResult<Self> {
        let api_key = config
            .api_key()
            .ok_or(GenerationError::MissingCredential)?
            .to_string();
        config.validate()?;

        let mut builder = reqwest::blocking::Client::builder();
        if config.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(config.timeout_ms));
        }
        if config.connect_timeout_ms > 0 {
            builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|err| GenerationError::ClientSetup(err.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim().trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
            suggestion_model: config.suggestion_model.trim().to_string(),
            api_key,
            client,
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.endpoint)
    }

    /// Sends one `generateContent` request and returns the concatenated reply text.
    fn generate(
        &self,
        operation: GenerationOperation,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GenerationResult<String> {
        debug!(
            "event=generation_call module=generation provider=gemini op={} model={model}",
            operation.as_str()
        );

        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .map_err(|err| {
                let error_kind = if err.is_timeout() {
                    "timeout"
                } else if err.is_connect() {
                    "connect"
                } else if err.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                error!(
                    "event=generation_call module=generation status=error op={} kind={error_kind}",
                    operation.as_str()
                );
                GenerationError::Request {
                    operation,
                    message: format!("{error_kind} error"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "event=generation_call module=generation status=error op={} http_status={}",
                operation.as_str(),
                status.as_u16()
            );
            return Err(GenerationError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        let reply: GenerateContentResponse = response.json().map_err(|_| {
            error!(
                "event=generation_call module=generation status=error op={} reason=undecodable_envelope",
                operation.as_str()
            );
            GenerationError::InvalidResponse { operation }
        })?;

        reply
            .text()
            .ok_or(GenerationError::InvalidResponse { operation })
    }
}

impl GenerationProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn compose_from_idea(&self, idea: &str) -> GenerationResult<Vec<GeneratedPrompt>> {
        let request = GenerateContentRequest::user_text(compose_instruction(idea)).with_json_schema(
            json!({
                "type": "OBJECT",
                "properties": {
                    "prompts": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "title": { "type": "STRING" },
                                "body": { "type": "STRING" },
                                "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
                            },
                            "required": ["title", "body", "tags"]
                        }
                    }
                },
                "required": ["prompts"]
            }),
        );
        let text = self.generate(GenerationOperation::Compose, &self.model, &request)?;
        let reply: ComposeReply = parse_json(&text, GenerationOperation::Compose)?;
        Ok(reply.prompts)
    }

    fn distill_bookmark(&self, url: &str) -> GenerationResult<Distillation> {
        let request =
            GenerateContentRequest::user_text(distill_instruction(url)).with_search_grounding();
        let text = self.generate(GenerationOperation::Distill, &self.model, &request)?;
        let reply: DistillReply = parse_json(&text, GenerationOperation::Distill)?;
        Ok(reply.into_distillation())
    }

    fn refine_prompt(&self, body: &str, framework: &str) -> GenerationResult<String> {
        let request = GenerateContentRequest::user_text(refine_instruction(body, framework));
        let text = self.generate(GenerationOperation::Refine, &self.model, &request)?;
        let refined = text.trim();
        if refined.is_empty() {
            return Err(GenerationError::InvalidResponse {
                operation: GenerationOperation::Refine,
            });
        }
        Ok(refined.to_string())
    }

    fn suggest_variable_values(
        &self,
        body: &str,
        variable_name: &str,
    ) -> GenerationResult<Vec<String>> {
        let request = GenerateContentRequest::user_text(suggest_instruction(body, variable_name))
            .with_json_schema(json!({
                "type": "OBJECT",
                "properties": {
                    "suggestions": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["suggestions"]
            }));
        let text = self.generate(
            GenerationOperation::Suggest,
            &self.suggestion_model,
            &request,
        )?;
        let reply: SuggestReply = parse_json(&text, GenerationOperation::Suggest)?;
        Ok(reply.suggestions)
    }
}

fn compose_instruction(idea: &str) -> String {
    [
        "Turn this idea into 5 high-quality, reusable prompts.",
        "For each prompt, provide a concise title, a detailed body, and identify useful variables in the format {{variable}}.",
        "Also suggest 3-5 relevant tags for categorization.",
        "Ensure the prompt body is well-structured and guides the AI effectively.",
        &format!("Seed Idea:\n{idea}"),
    ]
    .join("\n")
}

fn distill_instruction(url: &str) -> String {
    format!(
        r#"Based on the content found at the URL "{url}", perform the following tasks and respond ONLY with a single, valid JSON object that follows the specified schema. Do not include any other text outside of the JSON object.

Tasks:
1. Write a concise, insightful summary of the key ideas.
2. Suggest 3-5 relevant tags or keywords.
3. Generate 3 high-quality, reusable prompt ideas. For each prompt, provide a title and a body. Identify any variables using {{{{variable_name}}}} syntax.

JSON Schema:
{{
  "summary": "string",
  "tags": ["string"],
  "prompts": [
    {{
      "title": "string",
      "body": "string"
    }}
  ]
}}"#
    )
}

fn refine_instruction(body: &str, framework: &str) -> String {
    format!(
        "Take the following prompt and refine it using the \"{framework}\" framework. Only return the refined prompt body, nothing else.\n\nOriginal Prompt:\n---\n{body}"
    )
}

fn suggest_instruction(body: &str, variable_name: &str) -> String {
    [
        "You are an AI assistant that helps create high-quality prompt variables.".to_string(),
        format!(
            "Analyze the following prompt template and suggest 5-7 creative and diverse options for the \"{{{{{variable_name}}}}}\" variable."
        ),
        "The suggestions should be concise and directly usable as values for the variable."
            .to_string(),
        format!("\nPrompt Template:\n---\n{body}\n---"),
    ]
    .join("\n")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

impl GenerateContentRequest {
    fn user_text(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(text) }],
            }],
            generation_config: None,
            tools: Vec::new(),
        }
    }

    fn with_json_schema(mut self, schema: Value) -> Self {
        self.generation_config = Some(json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        }));
        self
    }

    fn with_search_grounding(mut self) -> Self {
        self.tools.push(json!({ "google_search": {} }));
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or `None` when it carries no text parts.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<String>();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ComposeReply {
    prompts: Vec<GeneratedPrompt>,
}

#[derive(Debug, Deserialize)]
struct DistillReply {
    summary: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    prompts: Vec<GeneratedPrompt>,
}

impl DistillReply {
    /// Every distilled prompt carries the page tags; tags a prompt came with
    /// are replaced.
    fn into_distillation(self) -> Distillation {
        let tags = self.tags;
        let prompts = self
            .prompts
            .into_iter()
            .map(|mut prompt| {
                prompt.tags = tags.clone();
                prompt
            })
            .collect();
        Distillation {
            summary: self.summary,
            prompts,
            tags,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuggestReply {
    #[serde(default)]
    suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{
        suggest_instruction, DistillReply, GeminiClient, GenerateContentRequest,
        GenerateContentResponse,
    };
    use crate::generation::{GenerationConfig, GenerationError};
    use serde_json::json;

    #[test]
    fn client_requires_credential() {
        let err = GeminiClient::from_config(&GenerationConfig::default())
            .err()
            .expect("mock config must not build a remote client");
        assert_eq!(err, GenerationError::MissingCredential);
    }

    #[test]
    fn url_targets_model_endpoint() {
        let config = GenerationConfig::default()
            .with_api_key("k")
            .with_endpoint("http://localhost:8080/");
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.generate_url("gemini-2.5-pro"),
            "http://localhost:8080/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn request_serializes_camel_case_config() {
        let request = GenerateContentRequest::user_text("hi".to_string())
            .with_json_schema(json!({ "type": "OBJECT" }));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn distilled_prompts_take_page_tags() {
        let reply: DistillReply = serde_json::from_value(json!({
            "summary": "s",
            "tags": ["ai", "docs"],
            "prompts": [
                { "title": "t", "body": "b" },
                { "title": "u", "body": "c", "tags": ["own"] }
            ]
        }))
        .unwrap();
        let distillation = reply.into_distillation();
        assert_eq!(distillation.prompts[0].tags, vec!["ai", "docs"]);
        assert_eq!(distillation.prompts[1].tags, vec!["ai", "docs"]);
        assert_eq!(distillation.tags, vec!["ai", "docs"]);
    }

    #[test]
    fn distilled_prompts_lose_own_tags_when_page_has_none() {
        let reply: DistillReply = serde_json::from_value(json!({
            "summary": "s",
            "prompts": [{ "title": "t", "body": "b", "tags": ["own"] }]
        }))
        .unwrap();
        let distillation = reply.into_distillation();
        assert!(distillation.prompts[0].tags.is_empty());
    }

    #[test]
    fn suggest_instruction_names_variable_marker() {
        assert!(suggest_instruction("body", "tone").contains("\"{{tone}}\""));
    }
}
