//! Gemini `generateContent` client with batch and SSE streaming modes.

use super::{Generator, TokenStream};
use crate::error::{GenerationFailure, RagError};
use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};
use juridoc_core::{config, Prompt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

/// Connection settings for [`GeminiGenerator`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API root without trailing slash, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: config::DEFAULT_GENERATION_MODEL.to_string(),
            base_url: config::DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(config::REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, in order.
    fn texts(self) -> Vec<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a Prompt) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![TextPart {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart { text: &prompt.user }],
            }],
            generation_config: GenerationConfig {
                temperature: prompt.sampling.temperature,
                top_p: prompt.sampling.top_p,
                top_k: prompt.sampling.top_k,
                max_output_tokens: prompt.sampling.max_output_tokens,
            },
        }
    }
}

/// Gemini REST generator.
pub struct GeminiGenerator {
    config: GeminiConfig,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, RagError> {
        if config.api_key.trim().is_empty() {
            return Err(RagError::Configuration(
                "Gemini API key is required (set GEMINI_API_KEY)".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    async fn post(&self, url: String, prompt: &Prompt) -> Result<reqwest::Response, GenerationFailure> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Gemini request rejected");
            return Err(GenerationFailure::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationFailure> {
        let response = self.post(self.endpoint("generateContent"), prompt).await?;
        let raw = response.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| GenerationFailure::Malformed(e.to_string()))?;
        let texts = parsed.texts();
        if texts.is_empty() {
            return Err(GenerationFailure::EmptyResponse);
        }
        Ok(texts.concat())
    }

    async fn generate_stream(&self, prompt: &Prompt) -> Result<TokenStream, GenerationFailure> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(url, prompt).await?;
        Ok(sse_text_stream(
            response.bytes_stream().map_err(GenerationFailure::from),
        ))
    }
}

struct SseDecoder<S> {
    body: Pin<Box<S>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String, GenerationFailure>>,
    finished: bool,
}

impl<S> SseDecoder<S> {
    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line);
            if self.finished {
                return;
            }
        }
    }

    fn handle_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let Some(data) = line.trim_end_matches(['\n', '\r']).strip_prefix("data:") else {
            return;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            return;
        }
        match serde_json::from_str::<GenerateContentResponse>(data) {
            Ok(chunk) => self.pending.extend(
                chunk
                    .texts()
                    .into_iter()
                    .filter(|t| !t.is_empty())
                    .map(Ok),
            ),
            Err(e) => {
                self.pending
                    .push_back(Err(GenerationFailure::Malformed(e.to_string())));
                self.finished = true;
            }
        }
    }
}

/// Decodes a `text/event-stream` body of `generateContent` chunks into text chunks.
///
/// The stream ends after the body ends or after the first error.
pub(crate) fn sse_text_stream<S, B>(body: S) -> TokenStream
where
    S: Stream<Item = Result<B, GenerationFailure>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let decoder = SseDecoder {
        body: Box::pin(body),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };
    futures::stream::unfold(decoder, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(bytes)) => {
                    st.buffer.extend_from_slice(bytes.as_ref());
                    st.drain_lines();
                }
                Some(Err(e)) => {
                    st.pending.push_back(Err(e));
                    st.finished = true;
                }
                None => {
                    let rest = std::mem::take(&mut st.buffer);
                    st.handle_line(&rest);
                    st.finished = true;
                }
            }
        }
    })
    .boxed()
}
