//! Transcribe an audio file: upload, submit, wait, print.
//!
//! Progress messages go to stderr; the report goes to stdout or the output
//! file.

use std::path::{Path, PathBuf};

use crate::commands::output::{emit, render_report};
use crate::config::{self, ScribeConfig};
use crate::transcription::{JobClient, JobId, JobOutcome};

/// Handles the full upload, submit, poll and summary pipeline for one file.
///
/// # Arguments
/// * `file` - Path to the audio file to transcribe
/// * `sentences` - Number of summary sentences
/// * `output_file` - Optional file path to write the report to instead of stdout
pub async fn handle_transcribe(
    file: PathBuf,
    sentences: usize,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== meetscribe Transcribe Command ===");
    tracing::info!("Transcribing file: {}", file.display());

    let client = build_client()?;
    let outcome = run_pipeline(&client, &file).await?;

    let report = render_report(&outcome.display_text(), sentences);
    emit(&report, output_file.as_deref())
}

/// Loads the configuration and builds a client from it.
///
/// # Errors
/// - If the configuration cannot be loaded or is invalid
/// - If no API key is configured
pub fn build_client() -> anyhow::Result<JobClient> {
    let config_data = ScribeConfig::load().map_err(|err| {
        tracing::error!("Failed to load configuration: {err:#}");
        anyhow::anyhow!("Configuration error: {err:#}")
    })?;

    let env_key = std::env::var(config::API_KEY_ENV).ok();
    let transcription_config = config_data.transcription_config(env_key)?;
    if transcription_config.poll.is_unbounded() {
        tracing::debug!("Polling without attempt limit or timeout");
    }

    Ok(JobClient::new(transcription_config)?)
}

/// Uploads `file`, submits it and waits for the job to finish.
///
/// A job that the service reports as failed is returned as
/// [`JobOutcome::Failed`]; every other failure aborts with an error.
pub async fn run_pipeline(client: &JobClient, file: &Path) -> anyhow::Result<JobOutcome> {
    eprintln!("Uploading audio file to AssemblyAI...");
    let upload_url = client.upload(file).await.map_err(|e| {
        tracing::error!("Upload failed: {e}");
        anyhow::anyhow!("Upload failed: {e}")
    })?;
    eprintln!("Upload complete!");

    let job_id = client.submit(&upload_url).await.map_err(|e| {
        tracing::error!("Submit failed: {e}");
        anyhow::anyhow!("Submitting transcription failed: {e}")
    })?;
    eprintln!("Transcription started! Job ID: {job_id}");
    tracing::info!("Transcription job {job_id} submitted");

    wait_for_job(client, &job_id).await
}

/// Polls an existing job and reports completion on stderr.
pub async fn wait_for_job(
    client: &JobClient,
    job_id: &JobId,
) -> anyhow::Result<JobOutcome> {
    eprintln!("Waiting for transcription to finish...");
    let outcome = client.poll(job_id).await.map_err(|e| {
        tracing::error!("Polling job {job_id} failed: {e}");
        anyhow::anyhow!("Waiting for transcription failed: {e}")
    })?;

    match &outcome {
        JobOutcome::Completed(text) => {
            eprintln!("Transcription complete!");
            tracing::info!("Job {job_id} completed: {} chars", text.len());
        }
        JobOutcome::Failed(detail) => {
            tracing::warn!("Job {job_id} failed: {detail}");
        }
    }

    Ok(outcome)
}
