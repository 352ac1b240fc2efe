//! Transcription job client for the AssemblyAI REST API.
//!
//! Upload audio, submit it as a job, poll the job until it is done.

pub mod api;
pub mod error;
pub mod job;
pub mod policy;

pub use api::{
    Credential, JobClient, TranscriptionConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_UPLOAD_TIMEOUT,
};
pub use job::{JobId, JobOutcome};
pub use policy::PollPolicy;
