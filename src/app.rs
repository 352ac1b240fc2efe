//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config;
use crate::logging;
use crate::setup;
use crate::summary::SUMMARY_SENTENCES;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Audio file transcribed when no file is given.
pub const DEFAULT_AUDIO_FILE: &str = "meeting.mp3";

/// Writes the default config file on first run.
fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = config::get_config_path()?;
    if setup::ensure_config(&config_path)? {
        eprintln!(
            "Created default configuration at {}. Add your AssemblyAI API key there or set {}.",
            config_path.display(),
            config::API_KEY_ENV
        );
    }
    Ok(())
}

/// Transcribe a meeting recording with AssemblyAI and print a quick summary
#[derive(Parser, Debug)]
#[command(name = "meetscribe")]
#[command(version)]
#[command(long_about = "Transcribe a meeting recording with AssemblyAI and print a quick summary.\n\nDEFAULT COMMAND:\n    If no command is specified, 'transcribe meeting.mp3' is used.\n\nEXAMPLES:\n    # Transcribe ./meeting.mp3\n    $ meetscribe\n\n    # Transcribe another file and keep three summary sentences\n    $ meetscribe transcribe standup.wav --sentences 3\n\n    # Write the report to a file\n    $ meetscribe transcribe standup.wav -o standup.txt\n\n    # Pick up a job submitted earlier\n    $ meetscribe status 6e1a1c0f-0a7e-4d2e-9c0b-3f6d1e2a4b5c\n\n    # Summarize an existing transcript\n    $ cat transcript.txt | meetscribe summarize")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/meetscribe/meetscribe.toml\n    API key override:   ASSEMBLYAI_API_KEY\n    Logs:               ~/.local/state/meetscribe/meetscribe.log.*"
)]
struct Cli {
    /// Number of sentences in the summary
    #[arg(short, long, value_name = "N", default_value_t = SUMMARY_SENTENCES, global = true)]
    sentences: usize,

    /// Write the report to file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload an audio file, wait for its transcript and print it with a summary (default)
    ///
    /// Polls the job every few seconds until it completes or fails. By default
    /// there is no time limit; set [poll] max_attempts or timeout_secs in the
    /// config file to give up eventually.
    #[command(visible_alias = "t")]
    Transcribe {
        /// Path to the audio file to transcribe
        #[arg(value_name = "FILE", default_value = DEFAULT_AUDIO_FILE)]
        file: PathBuf,
    },

    /// Wait for a previously submitted job and print its report
    #[command(visible_alias = "s")]
    Status {
        /// Job ID printed by an earlier transcribe run
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// Summarize an existing transcript (reads stdin when FILE is absent or '-')
    Summarize {
        /// Transcript text file
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Show the configuration in effect, with the API key redacted
    #[command(visible_alias = "c")]
    Config,

    /// Generate shell completion script
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If setup or logging initialization fails
/// - If command execution fails (configuration, upload, submit, polling)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "meetscribe", &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None => {
            check_and_run_setup()?;
            commands::handle_transcribe(PathBuf::from(DEFAULT_AUDIO_FILE), cli.sentences, cli.output)
                .await?;
        }
        Some(Commands::Transcribe { file }) => {
            check_and_run_setup()?;
            commands::handle_transcribe(file, cli.sentences, cli.output).await?;
        }
        Some(Commands::Status { job_id }) => {
            check_and_run_setup()?;
            commands::handle_status(job_id, cli.sentences, cli.output).await?;
        }
        Some(Commands::Summarize { file }) => {
            commands::handle_summarize(file, cli.sentences, cli.output)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) => {
            unreachable!("Completions are handled earlier")
        }
    }

    Ok(())
}
