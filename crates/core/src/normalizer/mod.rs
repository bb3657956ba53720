//! Text normalization
//!
//! Turns raw user text into the canonical token sequence that the matcher
//! vectorizes. The steps run in a fixed order:
//! 1. lowercase the whole string
//! 2. delete every ASCII punctuation character (mid-word too, so `don't` becomes `dont`)
//! 3. split into maximal runs of letters and digits
//! 4. reduce each token to its base form with [`Lemmatizer`]

mod lemma;

pub use lemma::Lemmatizer;

use crate::errors::IntentError;

#[derive(Clone, Debug, Default)]
pub struct TextNormalizer {
    lemmatizer: Lemmatizer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&self, text: &str) -> Vec<String> {
        let stripped = strip_punctuation(&text.to_lowercase());
        tokenize(&stripped).map(|token| self.lemmatizer.lemmatize(token)).collect()
    }

    /// Normalizes a raw line as read from an input stream.
    ///
    /// Bytes that are not valid UTF-8 have no textual meaning and fail with
    /// [`IntentError::InvalidInput`].
    pub fn normalize_bytes(&self, raw: &[u8]) -> Result<Vec<String>, IntentError> {
        Ok(self.normalize(decode_line(raw)?))
    }

    pub fn normalize_to_string(&self, text: &str) -> String {
        self.normalize(text).join(" ")
    }
}

/// Reads a raw input line as text, rejecting bytes that are not UTF-8.
pub fn decode_line(raw: &[u8]) -> Result<&str, IntentError> {
    std::str::from_utf8(raw)
        .map_err(|error| IntentError::InvalidInput(format!("input is not valid UTF-8: {error}")))
}

fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|character| !character.is_ascii_punctuation()).collect()
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|character: char| !character.is_alphanumeric()).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{decode_line, TextNormalizer};
    use crate::errors::IntentError;

    #[test]
    fn lowercases_strips_punctuation_and_lemmatizes() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(normalizer.normalize("What are your FEATURES?"), vec![
            "what", "are", "your", "feature"
        ]);
    }

    #[test]
    fn mid_word_punctuation_merges_tokens() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("don't"), vec!["dont"]);
        assert_eq!(normalizer.normalize("e-mail me@home"), vec!["email", "mehome"]);
    }

    #[test]
    fn punctuation_only_input_yields_no_tokens() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize("?!... ---").is_empty());
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   \t ").is_empty());
    }

    #[test]
    fn digits_are_kept_as_tokens() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("route 66 tasks"), vec!["route", "66", "task"]);
    }

    #[test]
    fn normalization_is_a_fixed_point_after_one_pass() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "Greetings, friends!",
            "The churches and boxes were EMPTY.",
            "Who are you??",
            "Berries, glasses, buses & children",
            "series of news about mathematics",
            "don't stop-believing",
            "Ünïcödé wörds — “quoted” text…",
            "firemen wolves leaves data",
        ];

        for sample in samples {
            let once = normalizer.normalize(sample);
            let twice = normalizer.normalize(&normalizer.normalize_to_string(sample));
            assert_eq!(once, twice, "normalization should be stable for {sample:?}");
        }
    }

    #[test]
    fn invalid_utf8_is_rejected_as_invalid_input() {
        let normalizer = TextNormalizer::new();
        let error = normalizer.normalize_bytes(&[0x68, 0x69, 0xff, 0xfe]);
        assert!(matches!(error, Err(IntentError::InvalidInput(_))));

        assert_eq!(normalizer.normalize_bytes(b"Hi there").ok(), Some(vec![
            "hi".to_string(),
            "there".to_string()
        ]));
    }

    #[test]
    fn decode_line_reports_where_the_bytes_stop_being_text() {
        assert_eq!(decode_line("héllo".as_bytes()), Ok("héllo"));
        match decode_line(&[0x68, 0x69, 0xff]) {
            Err(IntentError::InvalidInput(reason)) => {
                assert!(reason.contains("from index 2"), "{reason}");
            }
            other => panic!("expected invalid input, got {other:?}"),
        }
    }
}
