use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CorpusError, IntentError};
use crate::matcher::NO_MATCH;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

impl Intent {
    pub fn new(name: impl Into<String>, patterns: Vec<String>, responses: Vec<String>) -> Self {
        Self { name: name.into(), patterns, responses }
    }
}

/// One example phrase together with the intent that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhraseEntry {
    pub phrase: String,
    pub intent: String,
}

/// Immutable set of intents, built once and shared by the matcher and the
/// dialogue controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    intents: Vec<Intent>,
    terminal_intent: Option<String>,
    phrases: Vec<PhraseEntry>,
}

#[derive(Debug, Deserialize)]
struct CorpusDocument {
    terminal_intent: Option<String>,
    #[serde(default, rename = "intent")]
    intents: Vec<Intent>,
}

impl Corpus {
    pub fn new(intents: Vec<Intent>, terminal_intent: Option<String>) -> Result<Self, IntentError> {
        let mut seen = HashSet::new();
        for intent in &intents {
            let name = intent.name.trim();
            if name.is_empty() {
                return Err(IntentError::InvalidCorpus("intent names must not be empty".to_string()));
            }
            if name == NO_MATCH {
                return Err(IntentError::InvalidCorpus(format!(
                    "`{NO_MATCH}` is reserved for unmatched input and cannot name an intent"
                )));
            }
            if !seen.insert(intent.name.as_str()) {
                return Err(IntentError::InvalidCorpus(format!(
                    "intent `{}` is defined more than once",
                    intent.name
                )));
            }
            if intent.patterns.is_empty() {
                return Err(IntentError::InvalidCorpus(format!(
                    "intent `{}` has no example phrases",
                    intent.name
                )));
            }
            if intent.responses.is_empty() {
                return Err(IntentError::InvalidCorpus(format!(
                    "intent `{}` has no responses",
                    intent.name
                )));
            }
        }

        if let Some(terminal) = &terminal_intent {
            if !seen.contains(terminal.as_str()) {
                return Err(IntentError::UnknownIntent(terminal.clone()));
            }
        }

        let phrases = flatten_phrases(&intents);

        Ok(Self { intents, terminal_intent, phrases })
    }

    /// The default chatbot vocabulary.
    pub fn builtin() -> Self {
        let intents = vec![
            builtin_intent(
                "greeting",
                &["hi", "hello", "hey", "hola", "greetings"],
                &[
                    "Hello! How can I help you today?",
                    "Hi there! What's on your mind?",
                    "Hey! I'm your AI assistant.",
                ],
            ),
            builtin_intent(
                "capabilities",
                &["what can you do", "help", "tasks", "features"],
                &["I can chat with you, answer basic questions, and demonstrate NLP techniques like intent recognition!"],
            ),
            builtin_intent(
                "identity",
                &["who are you", "your name", "are you a bot"],
                &[
                    "I am a Rust-based chatbot that recognizes intents with TF-IDF similarity.",
                    "I'm your friendly neighborhood NLP bot!",
                ],
            ),
            builtin_intent(
                "goodbye",
                &["bye", "goodbye", "exit", "quit", "see you"],
                &["Goodbye! Have a great day.", "See you later!", "Talk to you soon!"],
            ),
        ];
        let phrases = flatten_phrases(&intents);

        Self { intents, terminal_intent: Some("goodbye".to_string()), phrases }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CorpusError> {
        let document = toml::from_str::<CorpusDocument>(raw).map_err(CorpusError::ParseFile)?;
        Ok(Self::new(document.intents, document.terminal_intent)?)
    }

    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CorpusError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Flattened phrases in definition order: intent order, then phrase order.
    pub fn all_example_phrases(&self) -> &[PhraseEntry] {
        &self.phrases
    }

    pub fn responses_for(&self, intent_name: &str) -> Result<&[String], IntentError> {
        self.intent(intent_name)
            .map(|intent| intent.responses.as_slice())
            .ok_or_else(|| IntentError::UnknownIntent(intent_name.to_string()))
    }

    pub fn is_terminal(&self, intent_name: &str) -> bool {
        self.terminal_intent.as_deref() == Some(intent_name)
    }

    pub fn intent(&self, intent_name: &str) -> Option<&Intent> {
        self.intents.iter().find(|intent| intent.name == intent_name)
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn terminal_intent(&self) -> Option<&str> {
        self.terminal_intent.as_deref()
    }

    pub fn ensure_non_empty(&self) -> Result<(), IntentError> {
        if self.phrases.is_empty() {
            return Err(IntentError::EmptyCorpus);
        }
        Ok(())
    }
}

fn flatten_phrases(intents: &[Intent]) -> Vec<PhraseEntry> {
    intents
        .iter()
        .flat_map(|intent| {
            intent
                .patterns
                .iter()
                .map(|phrase| PhraseEntry { phrase: phrase.clone(), intent: intent.name.clone() })
        })
        .collect()
}

fn builtin_intent(name: &str, patterns: &[&str], responses: &[&str]) -> Intent {
    Intent::new(
        name,
        patterns.iter().map(|value| (*value).to_string()).collect(),
        responses.iter().map(|value| (*value).to_string()).collect(),
    )
}
