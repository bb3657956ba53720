use parley_core::corpus::Corpus;
use parley_core::errors::IntentError;
use parley_core::matcher::{MatchResult, SimilarityMatcher};
use parley_core::normalizer::decode_line;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogueState {
    Running,
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// Blank input; nothing was matched and the state is unchanged.
    Ignored,
    Replied { response: String, result: MatchResult },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DialogueError {
    #[error("the conversation has already ended")]
    SessionClosed,
    #[error(transparent)]
    Intent(#[from] IntentError),
}

/// Drives one conversation: normalize, match, pick a reply, stop on the
/// terminal intent.
pub struct DialogueController<R: Rng> {
    corpus: Corpus,
    matcher: SimilarityMatcher,
    fallback_message: String,
    rng: R,
    state: DialogueState,
}

impl<R: Rng> DialogueController<R> {
    pub fn new(
        corpus: Corpus,
        matcher: SimilarityMatcher,
        fallback_message: impl Into<String>,
        rng: R,
    ) -> Result<Self, DialogueError> {
        corpus.ensure_non_empty()?;
        Ok(Self {
            corpus,
            matcher,
            fallback_message: fallback_message.into(),
            rng,
            state: DialogueState::Running,
        })
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    pub fn handle_input(&mut self, text: &str) -> Result<TurnOutcome, DialogueError> {
        if self.state == DialogueState::Stopped {
            return Err(DialogueError::SessionClosed);
        }
        if text.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        let result = self.matcher.match_text(text, &self.corpus)?;
        if !result.is_match() {
            return Ok(TurnOutcome::Replied { response: self.fallback_message.clone(), result });
        }

        let response = self
            .corpus
            .responses_for(&result.intent_name)?
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| {
                IntentError::InvalidCorpus(format!(
                    "intent `{}` has no responses",
                    result.intent_name
                ))
            })?;

        if result.is_terminal {
            self.state = DialogueState::Stopped;
        }

        Ok(TurnOutcome::Replied { response, result })
    }

    /// Same as [`Self::handle_input`] for a raw line that may not be UTF-8.
    pub fn handle_bytes(&mut self, raw: &[u8]) -> Result<TurnOutcome, DialogueError> {
        let text = decode_line(raw)?;
        self.handle_input(text)
    }
}
