pub mod commands;
pub mod session_store;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "showcase",
    about = "Showcase wizard operator CLI",
    long_about = "Walk server-defined payment form wizards, inspect saved sessions, and navigate them offline.",
    after_help = "Examples:\n  showcase walk --url https://money.example/api/showcase/5551 --answers answers.json\n  showcase inspect --session .showcase/walk-1.json\n  showcase back --session .showcase/walk-1.json\n  showcase config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, session directory, and HTTP client readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show state, history depth, current step, and params of a saved session")]
    Inspect {
        #[arg(long, help = "Session snapshot file")]
        session: PathBuf,
    },
    #[command(about = "Print the request the current step of a saved session would send")]
    Request {
        #[arg(long, help = "Session snapshot file")]
        session: PathBuf,
    },
    #[command(about = "Go back one step (or undo completion) in a saved session")]
    Back {
        #[arg(long, help = "Session snapshot file")]
        session: PathBuf,
    },
    #[command(about = "Fetch a showcase and submit answers until it stops advancing")]
    Walk {
        #[arg(long, help = "Showcase URL to fetch the first step from")]
        url: String,
        #[arg(long, help = "JSON object of field answers")]
        answers: Option<PathBuf>,
        #[arg(long, help = "Where to write the resulting session snapshot")]
        session: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Inspect { session } => commands::inspect::run(&session),
        Command::Request { session } => commands::request::run(&session),
        Command::Back { session } => commands::back::run(&session),
        Command::Walk { url, answers, session } => commands::walk::run(commands::walk::WalkArgs {
            url,
            answers,
            session,
        }),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
