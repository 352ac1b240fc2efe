//! Summarize an existing transcript without contacting the service.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;

use crate::commands::output::{emit, render_summary};

/// Prints the naive summary of a text file, or of stdin when `file` is
/// `None` or `-`.
pub fn handle_summarize(
    file: Option<PathBuf>,
    sentences: usize,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    let text = match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read transcript file {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read transcript from stdin")?;
            buffer
        }
    };

    tracing::debug!("Summarizing {} chars into {} sentences", text.len(), sentences);
    emit(&render_summary(&text, sentences), output_file.as_deref())
}
