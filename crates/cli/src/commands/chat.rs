use std::io::{self, BufRead, Write};

use parley_agent::{ChatRuntime, ChatSettings, DialogueController, DialogueError};
use parley_core::config::{AppConfig, LoadOptions};
use parley_core::errors::ApplicationError;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("chat", &ApplicationError::from(error)),
    };
    if let Err(error) = crate::logging::init(&config) {
        eprintln!("warning: log subscriber not installed: {error}");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    converse(&config, stdin.lock(), stdout.lock())
}

/// Runs one conversation over the given streams. Chat output goes to
/// `output`; the returned result carries no text on success.
pub fn converse<I: BufRead, O: Write>(config: &AppConfig, input: I, output: O) -> CommandResult {
    let corpus = match config.load_corpus() {
        Ok(corpus) => corpus,
        Err(error) => return CommandResult::from_error("chat", &ApplicationError::from(error)),
    };

    let rng = match config.dialogue.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let controller = match DialogueController::new(
        corpus,
        config.matcher(),
        config.dialogue.fallback_message.clone(),
        rng,
    ) {
        Ok(controller) => controller,
        Err(error) => return CommandResult::failure("chat", "corpus", error.to_string(), 3),
    };

    let settings = ChatSettings {
        banner: config.dialogue.banner.clone(),
        exit_hint: config.dialogue.exit_hint.clone(),
        prompt: config.dialogue.prompt.clone(),
        reply_prefix: config.dialogue.reply_prefix.clone(),
    };

    let mut runtime = ChatRuntime::new(controller, settings);
    match runtime.run(input, output) {
        Ok(_) => CommandResult::text(String::new()),
        Err(error) => match error.downcast_ref::<DialogueError>() {
            Some(DialogueError::Intent(intent_error)) => {
                CommandResult::from_error("chat", &ApplicationError::from(intent_error.clone()))
            }
            _ => CommandResult::failure("chat", "runtime_io", format!("{error:#}"), 4),
        },
    }
}
