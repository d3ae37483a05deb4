//! Ollama generation backend for the legacy chat path.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use mindforge_core::{defaults, ChatTurn, Error, GenerationBackend, Result};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEN_MODEL;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = defaults::GEN_TIMEOUT_SECS;

/// System prompt prepended to every legacy conversation.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Answer questions concisely and professionally.";

/// Generations slower than this are logged as slow.
const SLOW_GENERATION_MS: u64 = 30_000;

/// Sampling options sent with every request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: i32,
    pub num_ctx: i32,
    pub repeat_penalty: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: defaults::GEN_TEMPERATURE,
            top_p: defaults::GEN_TOP_P,
            num_predict: defaults::GEN_NUM_PREDICT,
            num_ctx: defaults::GEN_NUM_CTX,
            repeat_penalty: defaults::GEN_REPEAT_PENALTY,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

/// Ollama generation backend.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    gen_model: String,
    options: GenerateOptions,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_GEN_MODEL.to_string(),
            GEN_TIMEOUT_SECS,
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(base_url: String, gen_model: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        info!(
            subsystem = "inference",
            component = "ollama",
            url = %base_url,
            model = %gen_model,
            timeout_secs,
            "Initializing Ollama backend"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            gen_model,
            options: GenerateOptions::default(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("OLLAMA_BASE").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let gen_model =
            std::env::var("OLLAMA_GEN_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());
        let timeout = std::env::var("OLLAMA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        Self::with_config(base_url, gen_model, timeout)
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }
}

/// Build the flat prompt: system prompt, prior turns, then the new message
/// with an open assistant line.
pub fn build_prompt(history: &[ChatTurn], message: &str) -> String {
    let mut prompt = format!("{SYSTEM_PROMPT}\n\n");
    for turn in history {
        let speaker = if turn.is_user() { "User" } else { "Assistant" };
        prompt.push_str(&format!("{speaker}: {}\n", turn.content));
    }
    prompt.push_str(&format!("User: {message}\nAssistant:"));
    prompt
}

/// Text of a generate reply. A reply without a string `response` yields an
/// apology that embeds the raw JSON.
pub fn response_text(body: &serde_json::Value) -> String {
    match body.get("response").and_then(|v| v.as_str()) {
        Some(text) => text.to_string(),
        None => format!(
            "Sorry, the AI response had an unexpected format. Raw response: {}",
            body
        ),
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "ollama", op = "generate", model = %self.gen_model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let request = GenerateRequest {
            model: &self.gen_model,
            prompt,
            stream: false,
            options: &self.options,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Ollama API responded with status: {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse Ollama response: {e}")))?;

        let text = response_text(&body);
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(response_len = text.len(), duration_ms = elapsed, "Generation complete");
        if elapsed > SLOW_GENERATION_MS {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.gen_model
    }
}
