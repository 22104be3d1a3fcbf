//! Error types for the AI transport seam
//!
//! Startup paths use `anyhow` with context; the text-generation transport
//! reports typed failures so the bridge can log them before collapsing them
//! into one user-facing apology.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("request to text-generation endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text-generation endpoint returned HTTP {0}")]
    Status(u16),
    #[error("response did not contain generated text")]
    MalformedResponse,
    #[error("no API key found in environment variable {0}")]
    MissingCredential(String),
    #[error("AI task failed: {0}")]
    TaskFailed(String),
}
