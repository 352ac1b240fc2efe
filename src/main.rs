mod app;
mod commands;
mod config;
mod logging;
mod setup;
mod summary;
mod transcription;

use std::process;

/// Exit codes: 0 on success, 1 on any error, 2 on usage errors (from clap).
#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
