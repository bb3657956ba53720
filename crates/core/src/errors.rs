use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("corpus contains no example phrases")]
    EmptyCorpus,
    #[error("unknown intent `{0}`")]
    UnknownIntent(String),
    #[error("invalid corpus definition: {0}")]
    InvalidCorpus(String),
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("could not read corpus file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse corpus definition: {0}")]
    ParseFile(#[source] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] IntentError),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Intent(#[from] IntentError),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Corpus(_) | Self::Intent(IntentError::EmptyCorpus) => "corpus",
            Self::Intent(IntentError::InvalidCorpus(_)) => "corpus",
            Self::Intent(IntentError::InvalidInput(_)) => "invalid_input",
            Self::Intent(IntentError::UnknownIntent(_)) => "internal",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.error_class() {
            "config_validation" => "The configuration could not be loaded. Check parley.toml and PARLEY_* variables.",
            "corpus" => "The intent corpus is missing or malformed.",
            "invalid_input" => "The input could not be read as text.",
            _ => "An unexpected internal error occurred.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigError;
    use crate::errors::{ApplicationError, CorpusError, IntentError};

    #[test]
    fn empty_corpus_maps_to_corpus_class() {
        let error = ApplicationError::from(IntentError::EmptyCorpus);
        assert_eq!(error.error_class(), "corpus");
        assert_eq!(error.user_message(), "The intent corpus is missing or malformed.");
    }

    #[test]
    fn corpus_validation_error_keeps_its_message() {
        let error = ApplicationError::from(CorpusError::from(IntentError::InvalidCorpus(
            "intent `greeting` has no responses".to_owned(),
        )));
        assert_eq!(error.error_class(), "corpus");
        assert!(error.to_string().contains("greeting"));
    }

    #[test]
    fn unknown_intent_is_internal() {
        let error = ApplicationError::from(IntentError::UnknownIntent("weather".to_owned()));
        assert_eq!(error.error_class(), "internal");
        assert_eq!(error.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn configuration_error_maps_to_config_validation() {
        let error = ApplicationError::from(ConfigError::Validation("bad".to_owned()));
        assert_eq!(error.error_class(), "config_validation");
    }
}
