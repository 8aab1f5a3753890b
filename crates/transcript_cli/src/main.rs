//! `transcript-export`: turns saved conversation pages into IRC-style text transcripts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use engine_logging::{engine_error, LogDestination};
use log::LevelFilter;

mod commands;
mod config;

use commands::{run_export, run_inspect, ExportRequest};
use config::load_config;

#[derive(Parser, Debug)]
#[command(
    name = "transcript-export",
    version,
    about = "Export saved conversation pages as plain-text transcripts"
)]
struct Cli {
    /// RON file overriding selectors and export settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved page into a transcript
    Export(ExportArgs),
    /// Report what the exporter finds in a saved page, as JSON
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Saved HTML page of the conversation
    input: PathBuf,

    /// Directory for the transcript file (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the transcript instead of writing a file
    #[arg(long, conflicts_with = "output_dir")]
    stdout: bool,

    /// Print the result envelope as JSON
    #[arg(long)]
    json: bool,

    /// Drive the history loader before extracting
    #[arg(long)]
    full_history: bool,

    /// Leave out the header and footer
    #[arg(long)]
    no_header: bool,

    /// Blank line between messages
    #[arg(long)]
    separator: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Saved HTML page of the conversation
    input: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level);
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Export(args) => {
            let request = ExportRequest {
                input: args.input,
                output_dir: args.output_dir,
                to_stdout: args.stdout,
                json: args.json,
                full_history: args.full_history,
                no_header: args.no_header,
                separator: args.separator,
            };
            run_export(&request, config)
        }
        Command::Inspect(args) => run_inspect(&args.input, &config),
    }
}
