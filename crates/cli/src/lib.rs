pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use parley_core::config::{ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "Parley intent-recognition chatbot",
    long_about = "Chat with a TF-IDF intent matcher, classify single inputs, and inspect configuration readiness.",
    after_help = "Examples:\n  parley chat --seed 7\n  parley classify --json \"who are you?\"\n  parley doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a parley.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive conversation on stdin/stdout")]
    Chat {
        #[arg(long, help = "Intent corpus TOML file (defaults to the built-in corpus)")]
        corpus: Option<PathBuf>,
        #[arg(long, help = "Seed for reproducible response selection")]
        seed: Option<u64>,
    },
    #[command(about = "Classify one input and print the matched intent with its score")]
    Classify {
        #[arg(required = true, help = "Text to classify")]
        text: Vec<String>,
        #[arg(long, help = "Intent corpus TOML file (defaults to the built-in corpus)")]
        corpus: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, corpus loading, and intent reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = |corpus_path: Option<PathBuf>, seed: Option<u64>| LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides { corpus_path, seed, ..ConfigOverrides::default() },
    };

    let result = match &cli.command {
        Command::Chat { corpus, seed } => commands::chat::run(options(corpus.clone(), *seed)),
        Command::Classify { text, corpus, json } => {
            commands::classify::run(options(corpus.clone(), None), &text.join(" "), *json)
        }
        Command::Config => commands::CommandResult::text(commands::config::run(options(None, None))),
        Command::Doctor { json } => commands::doctor::run(options(None, None), *json),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
