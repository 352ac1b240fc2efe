//! Error types for the transcription job client.
//!
//! A job that the service itself reports as failed is not an error here; see
//! [`JobOutcome::Failed`](super::JobOutcome::Failed).

use std::path::PathBuf;
use std::time::Duration;

/// Failures surfaced by upload, submit and poll.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to read audio file {path}: {source}")]
    ReadAudio {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}", describe_status(.status, .body))]
    Status { status: u16, body: String },

    #[error("unexpected response from {endpoint}: {reason}")]
    MalformedResponse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("transcription still not finished after {attempts} status checks ({}s)", .elapsed.as_secs())]
    PollLimitExceeded { attempts: u32, elapsed: Duration },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Wraps a reqwest send error with a message naming the failed step.
    pub(crate) fn transport(step: &str, source: reqwest::Error) -> Self {
        let message = if source.is_connect() {
            format!("Failed to connect to AssemblyAI during {step}. Check your internet connection.")
        } else if source.is_timeout() {
            format!("AssemblyAI {step} request timed out. The API server is not responding.")
        } else {
            format!("AssemblyAI {step} network error: {source}")
        };
        ClientError::Transport { message, source }
    }
}

/// Formats HTTP error codes into human-readable messages.
fn describe_status(status: &u16, body: &str) -> String {
    match *status {
        401 => "AssemblyAI API key is invalid or expired. Check api_key in your meetscribe config.".to_string(),
        403 => "You don't have permission to use AssemblyAI's API. Check your API key and account status.".to_string(),
        429 => "Too many requests to AssemblyAI. You've hit the API rate limit. Please wait and try again.".to_string(),
        500 | 502 | 503 | 504 => format!("AssemblyAI API server is experiencing issues (status {status}): {body}"),
        _ => format!("AssemblyAI API error (status {status}): {body}"),
    }
}
