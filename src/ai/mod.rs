//! AI query bridge
//!
//! [`AiBridge`] turns a visitor's question into one text-generation request
//! grounded in the loaded profile. The HTTP transport sits behind the
//! [`TextGenerator`] trait; [`GeminiClient`] is the production
//! implementation.
//!
//! The bridge never fails towards its caller: every error is logged and
//! replaced by a fixed apology.

pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::error::BridgeError;
use crate::profile::Profile;

/// Answer given while no profile is available
pub const NOT_READY_MESSAGE: &str = "Sorry, portfolio data is still loading. Please try again.";

/// Answer given for any transport or response failure
pub const FAILURE_MESSAGE: &str = "Sorry, I couldn't get an answer. Please try again later.";

/// One-shot text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BridgeError>;
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

/// Client for the `generateContent` REST endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Build a client reading the API key from the configured variable
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            warn!(
                "{} is not set; AI answers will be unavailable",
                config.api_key_env
            );
        }
        if config.provider != "gemini" {
            warn!(
                "Unknown AI provider '{}', using the Gemini request format",
                config.provider
            );
        }
        Self::new(
            config.endpoint.as_str(),
            config.model.as_str(),
            config.api_key_env.as_str(),
            api_key,
        )
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, BridgeError> {
        let Some(key) = &self.api_key else {
            return Err(BridgeError::MissingCredential(self.api_key_env.clone()));
        };

        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        debug!("POST {} ({} prompt bytes)", self.url(), prompt.len());
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|_| BridgeError::MalformedResponse)?;
        extract_text(&value)
            .map(str::to_string)
            .ok_or(BridgeError::MalformedResponse)
    }
}

/// Generated text at `candidates[0].content.parts[0].text`
#[must_use]
pub fn extract_text(response: &Value) -> Option<&str> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Answers visitor questions about the profile owner
#[derive(Clone)]
pub struct AiBridge {
    profile: Option<Arc<Profile>>,
    generator: Arc<dyn TextGenerator>,
}

impl AiBridge {
    pub fn new(profile: Option<Arc<Profile>>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { profile, generator }
    }

    /// Ask one question and always get displayable text back
    pub async fn ask(&self, question: &str) -> String {
        let Some(profile) = &self.profile else {
            warn!("AI question received before the profile was loaded");
            return NOT_READY_MESSAGE.to_string();
        };

        info!("Sending AI question ({} chars)", question.chars().count());
        let prompt = prompt::build_prompt(profile, question);
        match self.generator.generate(&prompt).await {
            Ok(answer) => {
                debug!("AI answer received ({} chars)", answer.chars().count());
                answer
            }
            Err(e) => {
                warn!("AI request failed: {}", e);
                FAILURE_MESSAGE.to_string()
            }
        }
    }
}
