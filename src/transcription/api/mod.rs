//! Transcription API client.
//!
//! The service is driven through three calls (upload, submit, poll) made by
//! [`JobClient`]. Everything the client needs to talk to the service lives in a
//! [`TranscriptionConfig`] built once at startup.

mod assemblyai;

use std::fmt;
use std::time::Duration;

use super::policy::PollPolicy;

pub use assemblyai::JobClient;

/// Default AssemblyAI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com/v2";

/// Default limit for submit and status requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default limit for the upload request, which carries the whole recording.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(3600);

/// API key sent as the `authorization` header on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Configuration for transcription requests
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// The API key for authentication
    pub credential: Credential,
    /// API root, without trailing slash
    pub base_url: String,
    /// Overall timeout for a submit or status request
    pub request_timeout: Duration,
    /// Overall timeout for the upload request
    pub upload_timeout: Duration,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Interval and bounds for the status loop
    pub poll: PollPolicy,
}

impl TranscriptionConfig {
    /// Creates a configuration against the public AssemblyAI endpoint with
    /// default timeouts and unbounded polling.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            connect_timeout: Duration::from_secs(10),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
