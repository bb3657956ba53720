use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corpus::Corpus;
use crate::errors::CorpusError;
use crate::matcher::{SimilarityMatcher, DEFAULT_CONFIDENCE_THRESHOLD};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub corpus: CorpusConfig,
    pub matcher: MatcherConfig,
    pub dialogue: DialogueConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CorpusConfig {
    /// Intent definition file; the built-in corpus is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct MatcherConfig {
    pub confidence_threshold: f64,
}

#[derive(Clone, Debug)]
pub struct DialogueConfig {
    pub banner: String,
    pub exit_hint: String,
    pub prompt: String,
    pub reply_prefix: String,
    pub fallback_message: String,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub corpus_path: Option<PathBuf>,
    pub confidence_threshold: Option<f64>,
    pub seed: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I'm sorry, I didn't quite understand that. Could you rephrase?";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig { path: None },
            matcher: MatcherConfig { confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD },
            dialogue: DialogueConfig {
                banner: "--- NLP AI Chatbot Initialized ---".to_string(),
                exit_hint: "Type 'bye' to exit the conversation.".to_string(),
                prompt: "\nYou: ".to_string(),
                reply_prefix: "Bot: ".to_string(),
                fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
                seed: None,
            },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch, path.parent());
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("parley.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Loads the configured corpus, or the built-in one when no path is set.
    pub fn load_corpus(&self) -> Result<Corpus, CorpusError> {
        match &self.corpus.path {
            Some(path) => Corpus::load(path),
            None => Ok(Corpus::builtin()),
        }
    }

    pub fn matcher(&self) -> SimilarityMatcher {
        SimilarityMatcher::new(self.matcher.confidence_threshold)
    }

    fn apply_patch(&mut self, patch: ConfigPatch, base_dir: Option<&Path>) {
        if let Some(corpus) = patch.corpus {
            if let Some(path) = corpus.path {
                // Relative corpus paths resolve against the config file's directory.
                let path = match base_dir {
                    Some(base) if path.is_relative() && !base.as_os_str().is_empty() => {
                        base.join(path)
                    }
                    _ => path,
                };
                self.corpus.path = Some(path);
            }
        }

        if let Some(matcher) = patch.matcher {
            if let Some(confidence_threshold) = matcher.confidence_threshold {
                self.matcher.confidence_threshold = confidence_threshold;
            }
        }

        if let Some(dialogue) = patch.dialogue {
            if let Some(banner) = dialogue.banner {
                self.dialogue.banner = banner;
            }
            if let Some(exit_hint) = dialogue.exit_hint {
                self.dialogue.exit_hint = exit_hint;
            }
            if let Some(prompt) = dialogue.prompt {
                self.dialogue.prompt = prompt;
            }
            if let Some(reply_prefix) = dialogue.reply_prefix {
                self.dialogue.reply_prefix = reply_prefix;
            }
            if let Some(fallback_message) = dialogue.fallback_message {
                self.dialogue.fallback_message = fallback_message;
            }
            if let Some(seed) = dialogue.seed {
                self.dialogue.seed = Some(seed);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PARLEY_CORPUS_PATH") {
            self.corpus.path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("PARLEY_MATCHER_CONFIDENCE_THRESHOLD") {
            self.matcher.confidence_threshold =
                parse_f64("PARLEY_MATCHER_CONFIDENCE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("PARLEY_DIALOGUE_FALLBACK_MESSAGE") {
            self.dialogue.fallback_message = value;
        }
        if let Some(value) = read_env("PARLEY_DIALOGUE_SEED") {
            self.dialogue.seed = Some(parse_u64("PARLEY_DIALOGUE_SEED", &value)?);
        }

        let log_level = read_env("PARLEY_LOGGING_LEVEL").or_else(|| read_env("PARLEY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PARLEY_LOGGING_FORMAT").or_else(|| read_env("PARLEY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(corpus_path) = overrides.corpus_path {
            self.corpus.path = Some(corpus_path);
        }
        if let Some(confidence_threshold) = overrides.confidence_threshold {
            self.matcher.confidence_threshold = confidence_threshold;
        }
        if let Some(seed) = overrides.seed {
            self.dialogue.seed = Some(seed);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_matcher(&self.matcher)?;
        validate_dialogue(&self.dialogue)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("parley.toml"), PathBuf::from("config/parley.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_matcher(matcher: &MatcherConfig) -> Result<(), ConfigError> {
    let threshold = matcher.confidence_threshold;
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Validation(
            "matcher.confidence_threshold must be in range 0.0..=1.0".to_string(),
        ));
    }
    Ok(())
}

fn validate_dialogue(dialogue: &DialogueConfig) -> Result<(), ConfigError> {
    if dialogue.fallback_message.trim().is_empty() {
        return Err(ConfigError::Validation(
            "dialogue.fallback_message must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    corpus: Option<CorpusPatch>,
    matcher: Option<MatcherPatch>,
    dialogue: Option<DialoguePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CorpusPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct MatcherPatch {
    confidence_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct DialoguePatch {
    banner: Option<String>,
    exit_hint: Option<String>,
    prompt: Option<String>,
    reply_prefix: Option<String>,
    fallback_message: Option<String>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const PARLEY_VARS: &[&str] = &[
        "PARLEY_CORPUS_PATH",
        "PARLEY_MATCHER_CONFIDENCE_THRESHOLD",
        "PARLEY_DIALOGUE_FALLBACK_MESSAGE",
        "PARLEY_DIALOGUE_SEED",
        "PARLEY_LOGGING_LEVEL",
        "PARLEY_LOG_LEVEL",
        "PARLEY_LOGGING_FORMAT",
        "PARLEY_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn isolated_options() -> LoadOptions {
        LoadOptions {
            config_path: Some("/nonexistent/parley/parley.toml".into()),
            ..LoadOptions::default()
        }
    }

    #[test]
    fn defaults_use_builtin_corpus_and_standard_threshold() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(PARLEY_VARS);

        let config =
            AppConfig::load(isolated_options()).map_err(|err| format!("config load failed: {err}"))?;
        ensure(config.corpus.path.is_none(), "corpus path should default to builtin")?;
        ensure(
            (config.matcher.confidence_threshold - 0.20).abs() < f64::EPSILON,
            "default threshold should be 0.20",
        )?;
        ensure(config.dialogue.seed.is_none(), "seed should default to entropy")?;
        ensure(config.dialogue.prompt == "\nYou: ", "each prompt starts on a fresh blank line")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format is compact")?;
        let corpus = config.load_corpus().map_err(|err| err.to_string())?;
        ensure(corpus.terminal_intent() == Some("goodbye"), "builtin corpus ends on goodbye")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(PARLEY_VARS);
        env::set_var("TEST_PARLEY_FALLBACK", "Say again?");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("parley.toml");
            fs::write(
                &path,
                r#"
[corpus]
path = "intents.toml"

[dialogue]
fallback_message = "${TEST_PARLEY_FALLBACK}"
seed = 7
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.dialogue.fallback_message == "Say again?",
                "fallback message should be interpolated from environment",
            )?;
            ensure(config.dialogue.seed == Some(7), "seed should come from the file")?;
            ensure(
                config.corpus.path.as_deref() == Some(dir.path().join("intents.toml").as_path()),
                "relative corpus path should resolve next to the config file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_PARLEY_FALLBACK"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(PARLEY_VARS);
        env::set_var("PARLEY_MATCHER_CONFIDENCE_THRESHOLD", "0.35");
        env::set_var("PARLEY_DIALOGUE_SEED", "11");
        env::set_var("PARLEY_LOG_LEVEL", "info");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("parley.toml");
            fs::write(
                &path,
                r#"
[matcher]
confidence_threshold = 0.5

[dialogue]
seed = 3

[logging]
level = "error"
format = "json"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides { seed: Some(42), ..ConfigOverrides::default() },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                (config.matcher.confidence_threshold - 0.35).abs() < f64::EPSILON,
                "env threshold should win over file",
            )?;
            ensure(config.dialogue.seed == Some(42), "explicit override should win over env")?;
            ensure(config.logging.level == "info", "env log level alias should win over file")?;
            ensure(matches!(config.logging.format, LogFormat::Json), "file format should apply")?;
            Ok(())
        })();

        clear_vars(PARLEY_VARS);
        result
    }

    #[test]
    fn validation_rejects_out_of_range_threshold() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(PARLEY_VARS);

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { confidence_threshold: Some(1.5), ..ConfigOverrides::default() },
            ..isolated_options()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("confidence_threshold")),
            "validation failure should mention confidence_threshold",
        )
    }

    #[test]
    fn invalid_env_seed_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(PARLEY_VARS);
        env::set_var("PARLEY_DIALOGUE_SEED", "not-a-number");

        let result = AppConfig::load(isolated_options());
        clear_vars(PARLEY_VARS);

        ensure(
            matches!(result, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "PARLEY_DIALOGUE_SEED"),
            "bad seed should surface as an invalid env override",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(PARLEY_VARS);

        let result = AppConfig::load(LoadOptions { require_file: true, ..isolated_options() });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
