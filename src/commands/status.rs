//! Resume waiting on a job submitted earlier.

use crate::commands::output::{emit, render_report};
use crate::commands::transcribe::{build_client, wait_for_job};
use crate::transcription::JobId;

/// Polls an existing job by id and prints the report once it finishes.
///
/// # Arguments
/// * `job_id` - Identifier printed by a previous `transcribe` run
/// * `sentences` - Number of summary sentences
/// * `output_file` - Optional file path to write the report to instead of stdout
pub async fn handle_status(
    job_id: String,
    sentences: usize,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== meetscribe Status Command ===");

    let job_id = job_id.trim();
    if job_id.is_empty() {
        return Err(anyhow::anyhow!("Job ID cannot be empty"));
    }
    let job_id = JobId::new(job_id);

    let client = build_client()?;
    let outcome = wait_for_job(&client, &job_id).await?;

    let report = render_report(&outcome.display_text(), sentences);
    emit(&report, output_file.as_deref())
}
