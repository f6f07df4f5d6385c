pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dopgen",
    about = "Dopgen operator CLI",
    long_about = "Check bot readiness, inspect effective configuration, and prepare the inline client roster.",
    after_help = "Examples:\n  dopgen doctor --json\n  dopgen config\n  dopgen encode-clients --input data/clients.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog files, and agreement templates")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Encode a client roster JSON file for CLIENTS_JSON_B64")]
    EncodeClients {
        #[arg(long, help = "Path to the client roster JSON file")]
        input: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::CommandResult::printed(commands::config::run()),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::EncodeClients { input } => commands::encode_clients::run(&input),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
