//! Transcription job wire types and status handling.
//!
//! The service reports a job's status as a free-form string. Only `completed`
//! and `error` are terminal; anything else (`queued`, `processing`, or a value
//! this client has never seen) means "ask again later".

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ClientError, Result};

/// Opaque URL returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReference(String);

impl UploadReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier the service assigns to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a job as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
    /// A status value this client does not know; treated as non-terminal.
    Other(String),
}

impl JobStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Terminal result of polling a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Transcript text, exactly as the service returned it.
    Completed(String),
    /// Error detail reported by the service.
    Failed(String),
}

impl JobOutcome {
    /// Text shown in place of the transcript: the transcript itself, or
    /// `Error: <detail>` for a failed job.
    pub fn display_text(&self) -> String {
        match self {
            JobOutcome::Completed(text) => text.clone(),
            JobOutcome::Failed(detail) => format!("Error: {detail}"),
        }
    }
}

/// Response from the upload endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub upload_url: String,
}

/// Request body for the transcription endpoint
#[derive(Debug, Serialize)]
pub(crate) struct TranscriptRequest<'a> {
    pub audio_url: &'a str,
}

/// Response from the submit endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub id: String,
}

/// Response from the status endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptResponse {
    pub status: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TranscriptResponse {
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }

    /// Returns the outcome if the status is terminal, `None` otherwise.
    pub fn outcome(self) -> Result<Option<JobOutcome>> {
        let status = self.status();
        if !status.is_terminal() {
            return Ok(None);
        }
        match status {
            JobStatus::Completed => {
                let text = self.text.ok_or_else(|| ClientError::MalformedResponse {
                    endpoint: "/transcript/{id}",
                    reason: "status is completed but `text` is missing".to_string(),
                })?;
                Ok(Some(JobOutcome::Completed(text)))
            }
            JobStatus::Error => {
                let detail = self.error.ok_or_else(|| ClientError::MalformedResponse {
                    endpoint: "/transcript/{id}",
                    reason: "status is error but `error` is missing".to_string(),
                })?;
                Ok(Some(JobOutcome::Failed(detail)))
            }
            JobStatus::Queued | JobStatus::Processing | JobStatus::Other(_) => Ok(None),
        }
    }
}
