pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quickquote_core::config::{AppConfig, LoadOptions};

use commands::input::QuoteArgs;

#[derive(Debug, Parser)]
#[command(
    name = "quickquote",
    about = "Quick pricing quotes for freelance services",
    long_about = "Price a service from a rate, quantity, fees, extras, discount and tax, then print a \
                  breakdown, a ready-to-send client message, or a printable HTML export.",
    after_help = "Examples:\n  quickquote quote --rate 50 --quantity 10 --setup-fee 100\n  \
                  quickquote message --input quote.json --client Sam | pbcopy\n  \
                  quickquote export --input quote.json --output quote.html\n  \
                  quickquote doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "FILE", help = "Path to quickquote.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute a quote and print the breakdown followed by the client message")]
    Quote {
        #[command(flatten)]
        input: QuoteArgs,
        #[arg(long, help = "Emit the full evaluation as JSON")]
        json: bool,
    },
    #[command(about = "Print only the client message, ready to paste")]
    Message {
        #[command(flatten)]
        input: QuoteArgs,
    },
    #[command(about = "Render a printable HTML version of the quote")]
    Export {
        #[command(flatten)]
        input: QuoteArgs,
        #[arg(long, value_name = "FILE", help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and run a pricing self-check")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    // A broken config still gets default logging; the command reports the error.
    logging::init_logging(&AppConfig::load(options.clone()).unwrap_or_default());

    let result = match cli.command {
        Command::Quote { input, json } => commands::quote::run(&options, &input, json),
        Command::Message { input } => commands::message::run(&options, &input),
        Command::Export { input, output } => {
            commands::export::run(&options, &input, output.as_deref())
        }
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
