//! Errors raised at the LLM adapter boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} is not set in environment variables")]
    MissingApiKey(&'static str),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
