use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use parley_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

struct Sources {
    file_path: Option<PathBuf>,
    file_doc: Option<Value>,
}

pub fn run(options: LoadOptions) -> String {
    let overrides = options.overrides.clone();
    let file_path = resolve_config_path(options.config_path.as_deref());

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let sources = Sources { file_doc: load_config_file_doc(file_path.as_deref()), file_path };
    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    let corpus_path = config
        .corpus
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());
    lines.push(render_line(
        "corpus.path",
        &corpus_path,
        sources.field("corpus.path", &["PARLEY_CORPUS_PATH"], overrides.corpus_path.is_some()),
    ));
    lines.push(render_line(
        "matcher.confidence_threshold",
        &config.matcher.confidence_threshold.to_string(),
        sources.field(
            "matcher.confidence_threshold",
            &["PARLEY_MATCHER_CONFIDENCE_THRESHOLD"],
            overrides.confidence_threshold.is_some(),
        ),
    ));

    for (key, value) in [
        ("dialogue.banner", &config.dialogue.banner),
        ("dialogue.exit_hint", &config.dialogue.exit_hint),
        ("dialogue.prompt", &config.dialogue.prompt),
        ("dialogue.reply_prefix", &config.dialogue.reply_prefix),
    ] {
        lines.push(render_line(key, &format!("{value:?}"), sources.field(key, &[], false)));
    }
    lines.push(render_line(
        "dialogue.fallback_message",
        &format!("{:?}", config.dialogue.fallback_message),
        sources.field("dialogue.fallback_message", &["PARLEY_DIALOGUE_FALLBACK_MESSAGE"], false),
    ));
    lines.push(render_line(
        "dialogue.seed",
        &config.dialogue.seed.map(|seed| seed.to_string()).unwrap_or_else(|| "<entropy>".to_string()),
        sources.field("dialogue.seed", &["PARLEY_DIALOGUE_SEED"], overrides.seed.is_some()),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        sources.field(
            "logging.level",
            &["PARLEY_LOGGING_LEVEL", "PARLEY_LOG_LEVEL"],
            overrides.log_level.is_some(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        sources.field("logging.format", &["PARLEY_LOGGING_FORMAT", "PARLEY_LOG_FORMAT"], false),
    ));

    lines.join("\n")
}

impl Sources {
    fn field(&self, key_path: &str, env_keys: &[&str], overridden: bool) -> String {
        if overridden {
            return "override (command line)".to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env_is_set(key)) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn env_is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
