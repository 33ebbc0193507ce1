//! OpenAI-compatible completion provider
//!
//! Talks to any chat-completions endpoint speaking the OpenAI wire format.
//! One-shot completions parse the full response body; streaming completions
//! decode SSE chunks into incremental content deltas.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::upstream::sse::SseDecoder;
use crate::upstream::{ChunkStream, CompletionProvider, UpstreamError};

/// Sentinel payload closing an SSE completion stream
const STREAM_DONE: &str = "[DONE]";

/// Client for an OpenAI-compatible chat-completions API
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider from application configuration
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.upstream_api_url.clone(),
            api_key: config.upstream_api_key.clone(),
            model: config.upstream_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    fn chat_request<'a>(&'a self, prompt: &'a str, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            stream,
        }
    }

    async fn send(
        &self,
        request: &ChatRequest<'_>,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Upstream completion request failed");
            return Err(UpstreamError::from_status(status.as_u16(), body));
        }

        Ok(response)
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .expect("Invalid API key"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let request = self.chat_request(prompt, false);
        let response = self.send(&request).await?;

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::Protocol(format!("unparseable completion: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Protocol("completion has no content".to_string()))?;

        debug!(content_len = content.len(), "Upstream completion received");
        Ok(content)
    }

    async fn complete_stream(&self, prompt: &str) -> Result<ChunkStream, UpstreamError> {
        let request = self.chat_request(prompt, true);
        let response = self.send(&request).await?;

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        yield Err(UpstreamError::from(err));
                        return;
                    }
                };
                for payload in decoder.feed(&chunk) {
                    if payload == STREAM_DONE {
                        return;
                    }
                    match serde_json::from_str::<StreamChunk>(&payload) {
                        Ok(parsed) => {
                            let delta = parsed
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|choice| choice.delta.content);
                            if let Some(content) = delta {
                                if !content.is_empty() {
                                    yield Ok(content);
                                }
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, payload_len = payload.len(), "Skipping unparseable stream chunk");
                        }
                    }
                }
            }
            if decoder.has_partial() {
                warn!("Upstream stream ended with a truncated SSE line");
            }
        };

        Ok(Box::pin(stream))
    }
}
