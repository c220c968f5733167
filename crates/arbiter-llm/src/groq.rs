//! Groq Chat Completions API integration (OpenAI-compatible wire format).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use arbiter_core::error::{ArbiterError, ModelError, Result};
use arbiter_core::message::Message;
use arbiter_core::model::{CallOptions, ChatModel, ChatResult, ResponseFormat};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

// ---------------------------------------------------------------------------
// Chat Completions request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GroqRequest {
    pub model: String,
    pub messages: Vec<GroqMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<GroqResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct GroqMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct GroqResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Debug, Deserialize)]
pub struct GroqResponse {
    pub choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
pub struct GroqChoice {
    pub message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct GroqResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroqError {
    pub error: GroqErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GroqErrorDetail {
    pub message: String,
}

// ---------------------------------------------------------------------------
// GroqChatModel
// ---------------------------------------------------------------------------

pub struct GroqChatModel {
    api_key: String,
    model_id: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GroqChatModel {
    pub fn new(api_key: String, model_id: String) -> Self {
        Self {
            api_key,
            model_id,
            endpoint: GROQ_API_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different chat-completions endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn build_request(&self, messages: &[Message], options: &CallOptions) -> GroqRequest {
        let api_messages = messages
            .iter()
            .map(|msg| {
                let role = match msg {
                    Message::System { .. } => "system",
                    Message::User { .. } => "user",
                    Message::Ai { .. } => "assistant",
                };
                GroqMessage {
                    role: role.into(),
                    content: msg.content().to_string(),
                }
            })
            .collect();

        let response_format = match options.response_format {
            Some(ResponseFormat::JsonObject) => Some(GroqResponseFormat {
                format_type: "json_object".into(),
            }),
            Some(ResponseFormat::Text) | None => None,
        };

        GroqRequest {
            model: self.model_id.clone(),
            messages: api_messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format,
        }
    }
}

#[async_trait]
impl ChatModel for GroqChatModel {
    async fn generate(&self, messages: &[Message], options: &CallOptions) -> Result<ChatResult> {
        let request_body = self.build_request(messages, options);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ArbiterError::Model(ModelError::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            let error_msg = serde_json::from_str::<GroqError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ArbiterError::Model(match status.as_u16() {
                401 => ModelError::Auth(error_msg),
                429 => ModelError::RateLimited {
                    retry_after_secs: None,
                },
                _ => ModelError::ApiRequest(format!("HTTP {status}: {error_msg}")),
            }));
        }

        let api_response: GroqResponse = response
            .json()
            .await
            .map_err(|e| ArbiterError::Model(ModelError::InvalidResponse(e.to_string())))?;

        let text = api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                ArbiterError::Model(ModelError::InvalidResponse(
                    "response contained no message content".into(),
                ))
            })?;

        Ok(ChatResult {
            message: Message::ai(text),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}
