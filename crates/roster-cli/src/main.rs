//! Roster CLI - platform inventory extractor
//!
//! Provides `roster fetch` and `roster report`.

mod logging;
mod pipeline;
mod prompt;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pipeline::Outcome;
use prompt::StdinConfirm;
use roster_core::{AssumeYes, Confirm, SnapshotMode};
use settings::Settings;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster - application, project, branch and role inventory")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./roster.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory; snapshots land in a per-tenant subdirectory
    #[arg(short, long, global = true, value_name = "DIR")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every resource and build the project report
    Fetch {
        /// Snapshot mode for every resource: always-fetch, reuse or prompt
        #[arg(short, long, value_name = "MODE")]
        mode: Option<SnapshotMode>,

        /// Answer yes to every overwrite prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Rebuild the project report from saved snapshots
    Report,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        settings.output_dir = output;
    }
    logging::init_tracing(&settings.log)?;

    match cli.command {
        Commands::Fetch { mode, yes } => {
            if let Some(mode) = mode {
                settings.snapshots.override_all(mode);
            }
            let confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(StdinConfirm)
            };

            match pipeline::run_fetch(&settings, confirm.as_ref())? {
                Outcome::Completed { report, rows } => {
                    println!("Report written: {} ({rows} rows)", report.display());
                    Ok(ExitCode::SUCCESS)
                }
                Outcome::Declined(_) => {
                    println!("Cancelled.");
                    Ok(ExitCode::SUCCESS)
                }
                Outcome::Empty(resource) => {
                    eprintln!("No {resource} collected, pipeline stopped.");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Report => {
            let (report, rows) = pipeline::run_report(&settings)?;
            println!("Report written: {} ({rows} rows)", report.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
