//! Similarity Matcher
//!
//! Classifies free text against the example phrases of a [`Corpus`]. Every
//! call re-fits the TF-IDF space over the corpus phrases plus the user text,
//! so words that only appear in the user text still shape the IDF weights.
//! The best phrase wins with ties going to the earliest phrase in corpus
//! order, and scores strictly below the confidence threshold yield
//! [`NO_MATCH`].

pub mod stop_words;
pub mod tfidf;

use std::collections::HashSet;

use serde::Serialize;

use crate::corpus::Corpus;
use crate::errors::IntentError;
use crate::normalizer::TextNormalizer;
use tfidf::{cosine, TfidfSpace};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.20;

/// Intent name reported when no phrase is similar enough.
pub const NO_MATCH: &str = "none";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub intent_name: String,
    pub score: f64,
    pub is_terminal: bool,
}

impl MatchResult {
    pub fn no_match(score: f64) -> Self {
        Self { intent_name: NO_MATCH.to_string(), score, is_terminal: false }
    }

    pub fn is_match(&self) -> bool {
        self.intent_name != NO_MATCH
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhraseScore {
    pub position: usize,
    pub phrase: String,
    pub intent: String,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Match,
    NoMatch,
}

pub fn decide(score: f64, threshold: f64) -> Decision {
    if score < threshold {
        Decision::NoMatch
    } else {
        Decision::Match
    }
}

#[derive(Clone, Debug)]
pub struct SimilarityMatcher {
    normalizer: TextNormalizer,
    stop_words: HashSet<&'static str>,
    threshold: f64,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl SimilarityMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { normalizer: TextNormalizer::new(), stop_words: stop_words::english(), threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Scores the user text against every example phrase, in corpus order.
    pub fn score_all(&self, user_text: &str, corpus: &Corpus) -> Result<Vec<PhraseScore>, IntentError> {
        let phrases = corpus.all_example_phrases();
        if phrases.is_empty() {
            return Err(IntentError::EmptyCorpus);
        }

        let mut documents = phrases
            .iter()
            .map(|entry| self.normalizer.normalize(&entry.phrase))
            .collect::<Vec<_>>();
        documents.push(self.normalizer.normalize(user_text));

        let space = TfidfSpace::fit(&documents, &self.stop_words);
        let query = space.row(phrases.len()).unwrap_or_default();

        Ok(phrases
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                let score = space
                    .row(position)
                    .map(|row| cosine(query, row).clamp(0.0, 1.0))
                    .unwrap_or(0.0);
                PhraseScore {
                    position,
                    phrase: entry.phrase.clone(),
                    intent: entry.intent.clone(),
                    score,
                }
            })
            .collect())
    }

    pub fn match_text(&self, user_text: &str, corpus: &Corpus) -> Result<MatchResult, IntentError> {
        let scores = self.score_all(user_text, corpus)?;

        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.score > best.score {
                best = candidate;
            }
        }

        match decide(best.score, self.threshold) {
            Decision::NoMatch => Ok(MatchResult::no_match(best.score)),
            Decision::Match => Ok(MatchResult {
                intent_name: best.intent.clone(),
                score: best.score,
                is_terminal: corpus.is_terminal(&best.intent),
            }),
        }
    }
}
