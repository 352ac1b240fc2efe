//! Report rendering and output destination handling.

use crate::summary::first_sentences;

/// Renders the transcript section followed by the summary section.
pub fn render_report(transcript: &str, sentences: usize) -> String {
    let mut report = String::new();
    report.push_str("\n=== TRANSCRIPT ===\n");
    report.push_str(transcript);
    report.push('\n');
    report.push_str("\n=== SUMMARY ===\n");
    report.push_str(&render_summary(transcript, sentences));
    report
}

/// Renders the summary as one `- sentence` line per entry.
pub fn render_summary(text: &str, sentences: usize) -> String {
    first_sentences(text, sentences)
        .into_iter()
        .map(|sentence| format!("- {sentence}\n"))
        .collect()
}

/// Writes `content` to `output_file` when given, stdout otherwise.
pub fn emit(content: &str, output_file: Option<&str>) -> anyhow::Result<()> {
    if let Some(file_path) = output_file {
        std::fs::write(file_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write to file '{file_path}': {e}"))?;
        tracing::debug!("Output written to file: {file_path}");
    } else {
        print!("{content}");
        tracing::debug!("Output printed to stdout");
    }
    Ok(())
}
