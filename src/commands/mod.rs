//! Application command handlers for meetscribe.
//!
//! # Commands
//! - `transcribe`: Upload an audio file, wait for the transcript, print it with a summary (default)
//! - `status`: Wait for a job submitted earlier and print its report
//! - `summarize`: Summarize an existing transcript
//! - `config`: Show the configuration a run would use

pub mod config;
pub mod output;
pub mod status;
pub mod summarize;
pub mod transcribe;

pub use config::handle_config;
pub use status::handle_status;
pub use summarize::handle_summarize;
pub use transcribe::handle_transcribe;
