pub mod config;
pub mod corpus;
pub mod errors;
pub mod matcher;
pub mod normalizer;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use corpus::{Corpus, Intent, PhraseEntry};
pub use errors::{ApplicationError, CorpusError, IntentError};
pub use matcher::{
    decide, Decision, MatchResult, PhraseScore, SimilarityMatcher, DEFAULT_CONFIDENCE_THRESHOLD,
    NO_MATCH,
};
pub use normalizer::TextNormalizer;
