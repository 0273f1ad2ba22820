//! Article summarization through an OpenAI-compatible chat API.
//!
//! This module is the boundary between the extraction engine and the hosted
//! language model:
//! - [`Summarize`]: async text-in/text-out trait the boundary flow depends on
//! - [`ChatSummarizer`]: implementation over a `/chat/completions` endpoint
//!   (Groq by default)
//! - [`summarize_article`]: fetch, extract, validate, then summarize, mapping
//!   every failure to a [`SummaryError`] the user can tell apart
//!
//! The prompt is fixed configuration: a neutral news-desk summary in Spanish
//! with a short overview, key points and optional context.

use crate::article::extract_article;
use crate::error::ExtractionError;
use crate::fetch::FetchDocument;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Extracted text shorter than this is not worth summarizing.
pub const MIN_USABLE_CHARS: usize = 100;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Returned when the model answers with no content.
pub const EMPTY_SUMMARY: &str = "No se pudo generar el resumen";

const SYSTEM_PROMPT: &str = "Eres un periodista experto que resume noticias de forma clara y concisa en español. \nGenera un resumen estructurado con:\n- **Resumen:** (2-3 oraciones con lo más importante)\n- **Puntos clave:** (3-5 puntos en lista)\n- **Contexto:** (1-2 oraciones de contexto adicional si es relevante)\n\nMantén un tono neutral y objetivo.";

fn user_prompt(title: &str, body: &str) -> String {
    format!("Resume esta noticia titulada \"{title}\":\n\n{body}")
}

/// Failure of the summarization service itself.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("no API key configured (set GROQ_API_KEY)")]
    MissingApiKey,

    #[error("summarization request timed out")]
    Timeout,

    #[error("summarization request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("summarization API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("could not decode summarization response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SummarizeError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SummarizeError::Timeout
        } else {
            SummarizeError::Http(err)
        }
    }
}

/// Trait for async summarization.
///
/// Implementors turn an article title and body into summary prose. The
/// boundary flow checks [`Summarize::is_available`] before doing any network
/// work so a missing credential is reported without fetching the article.
#[allow(async_fn_in_trait)]
pub trait Summarize {
    fn is_available(&self) -> bool {
        true
    }

    async fn summarize(&self, title: &str, body: &str) -> Result<String, SummarizeError>;
}

/// Connection settings for [`ChatSummarizer`].
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`Summarize`] over an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatSummarizer {
    http: Client,
    config: ChatConfig,
}

impl ChatSummarizer {
    pub fn new(config: ChatConfig) -> Result<Self, SummarizeError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SummarizeError::Http)?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, title: &str, body: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(user_prompt(title, body)),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

impl Summarize for ChatSummarizer {
    fn is_available(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    #[instrument(level = "info", skip_all, fields(model = %self.config.model))]
    async fn summarize(&self, title: &str, body: &str) -> Result<String, SummarizeError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SummarizeError::MissingApiKey)?;

        let t0 = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.build_request(title, body))
            .send()
            .await
            .map_err(SummarizeError::from_reqwest)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(SummarizeError::from_reqwest)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            warn!(
                %status,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                message = %truncate_for_log(&message, 300),
                "Summarization API error"
            );
            return Err(SummarizeError::Api { status, message });
        }

        let parsed: ChatResponse = serde_json::from_slice(&bytes)?;
        let summary = parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| EMPTY_SUMMARY.to_string());

        info!(
            chars = summary.chars().count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Summary generated"
        );
        Ok(summary)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Why a summary request was rejected, phrased for the reader.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("URL requerida")]
    MissingUrl,

    #[error("No se pudo obtener el contenido del artículo")]
    Unreachable(#[source] ExtractionError),

    #[error("No se pudo extraer suficiente contenido del artículo ({chars} caracteres)")]
    InsufficientContent { chars: usize },

    #[error("El servicio de resúmenes no está disponible: {0}")]
    ServiceUnavailable(#[source] SummarizeError),
}

/// Fetch `url`, extract its body and summarize it under `title`.
///
/// Checks run in order: a URL is present, the summarizer is available, the
/// article can be fetched, at least [`MIN_USABLE_CHARS`] characters were
/// extracted. Only then is the model called.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn summarize_article<S: Summarize>(
    fetcher: &dyn FetchDocument,
    summarizer: &S,
    url: &str,
    title: &str,
    timeout: Duration,
) -> Result<String, SummaryError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(SummaryError::MissingUrl);
    }
    if !summarizer.is_available() {
        error!("Summarizer not configured");
        return Err(SummaryError::ServiceUnavailable(SummarizeError::MissingApiKey));
    }

    let extraction = extract_article(fetcher, url, timeout)
        .await
        .map_err(SummaryError::Unreachable)?;

    let chars = extraction.char_len();
    if chars < MIN_USABLE_CHARS {
        warn!(chars, "Extracted text below usable minimum");
        return Err(SummaryError::InsufficientContent { chars });
    }

    summarizer
        .summarize(title, extraction.text())
        .await
        .map_err(SummaryError::ServiceUnavailable)
}
