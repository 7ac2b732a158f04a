pub mod normalize;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::model::{IslaTurn, Luma, Settings, Swatch};

/// Most recent observed deployment of the service.
pub const DEFAULT_BASE_URL: &str = "https://chromosbackendv8.onrender.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the Chromos service.
///
/// One outstanding request per interaction affordance; no retries, no
/// cancellation. All failure modes — transport errors, non-success status,
/// non-JSON bodies, and application-level `error` fields — surface as a
/// single `anyhow::Error` for the caller to display.
pub struct ChromosClient {
    client: Client,
    base_url: String,
}

/// Conversation context sent alongside a chat prompt.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatContext {
    pub label: String,
    pub tags: Vec<String>,
    pub tone: String,
}

#[derive(Serialize)]
struct GeneratePayload<'a> {
    prompt: &'a str,
    num_colors: u8,
    strict_ada: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone_preset: Option<&'a str>,
}

#[derive(Serialize)]
struct ThreadEntry<'a> {
    user: &'a str,
    isla: &'a str,
}

#[derive(Serialize)]
struct ChatPayload<'a> {
    prompt: &'a str,
    context: &'a ChatContext,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    thread: Vec<ThreadEntry<'a>>,
}

#[derive(Serialize)]
struct FixPayload<'a> {
    palette: &'a [Swatch],
}

impl ChromosClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, payload: &impl Serialize) -> Result<Value> {
        tracing::debug!(path, "dispatching request");
        let response = self
            .client
            .post(self.endpoint(path))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("request to /{path} failed"))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("response from /{path} was not JSON (status {status})"))?;

        // An error field wins over the status line: the service reports
        // application failures in the body and its text is shown verbatim.
        if let Some(message) = normalize::error_field(&body) {
            bail!("{message}");
        }
        if !status.is_success() {
            bail!("service returned {status} for /{path}");
        }
        tracing::debug!(path, "request completed");
        Ok(body)
    }

    /// Generate a palette from a natural-language prompt.
    ///
    /// Empty and whitespace-only prompts never reach the network.
    pub async fn generate(&self, prompt: &str, settings: &Settings) -> Result<Luma> {
        let prompt = non_empty(prompt)?;
        let settings = settings.clone().clamped();
        let payload = GeneratePayload {
            prompt,
            num_colors: settings.palette_length,
            strict_ada: settings.strict_ada,
            tone_preset: settings.tone_preset.as_deref(),
        };
        let body = self.post("generate-luma", &payload).await?;
        normalize::luma(&body)
    }

    /// Ask Isla to refine or explain the current palette. `thread` carries
    /// the prior exchanges so the persona keeps its conversational memory.
    pub async fn chat(
        &self,
        prompt: &str,
        context: &ChatContext,
        thread: &[IslaTurn],
    ) -> Result<IslaTurn> {
        let prompt = non_empty(prompt)?;
        let payload = ChatPayload {
            prompt,
            context,
            thread: thread
                .iter()
                .map(|turn| ThreadEntry {
                    user: &turn.prompt,
                    isla: &turn.reply,
                })
                .collect(),
        };
        let body = self.post("chat-isla", &payload).await?;
        Ok(normalize::isla_turn(prompt, &body))
    }

    /// Request server-side accessibility remediation for a palette.
    pub async fn make_ada_compliant(&self, palette: &[Swatch]) -> Result<Vec<Swatch>> {
        let body = self
            .post("make-ada-compliant", &FixPayload { palette })
            .await?;
        normalize::fixed_palette(&body)
    }
}

fn non_empty(prompt: &str) -> Result<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        bail!("prompt is empty");
    }
    Ok(trimmed)
}
