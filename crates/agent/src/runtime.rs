use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use parley_core::errors::IntentError;
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dialogue::{DialogueController, DialogueError, DialogueState, TurnOutcome};

const UNREADABLE_LINE: &str = "I couldn't read that line as text. Please try again.";

/// Fixed text printed around the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatSettings {
    pub banner: String,
    pub exit_hint: String,
    pub prompt: String,
    pub reply_prefix: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            banner: "--- NLP AI Chatbot Initialized ---".to_string(),
            exit_hint: "Type 'bye' to exit the conversation.".to_string(),
            prompt: "\nYou: ".to_string(),
            reply_prefix: "Bot: ".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    Farewell,
    EndOfInput,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub turns: usize,
    pub matched: usize,
    pub fallbacks: usize,
    pub ignored: usize,
    pub exit_reason: ExitReason,
}

pub struct ChatRuntime<R: Rng> {
    controller: DialogueController<R>,
    settings: ChatSettings,
    session_id: Uuid,
}

impl<R: Rng> ChatRuntime<R> {
    pub fn new(controller: DialogueController<R>, settings: ChatSettings) -> Self {
        Self { controller, settings, session_id: Uuid::new_v4() }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> DialogueState {
        self.controller.state()
    }

    /// Runs the conversation until the terminal intent matches or input ends.
    pub fn run<I: BufRead, O: Write>(&mut self, mut input: I, mut output: O) -> Result<SessionSummary> {
        let mut summary = SessionSummary {
            session_id: self.session_id,
            turns: 0,
            matched: 0,
            fallbacks: 0,
            ignored: 0,
            exit_reason: ExitReason::EndOfInput,
        };

        info!(
            event_name = "chat.session.started",
            session_id = %self.session_id,
            intents = self.controller.corpus().intents().len(),
            "chat session started"
        );
        writeln!(output, "{}", self.settings.banner).context("failed to write banner")?;
        writeln!(output, "{}", self.settings.exit_hint).context("failed to write exit hint")?;

        let mut line = Vec::new();
        loop {
            write!(output, "{}", self.settings.prompt).context("failed to write prompt")?;
            output.flush().context("failed to flush output")?;

            line.clear();
            let read = input.read_until(b'\n', &mut line).context("failed to read input line")?;
            if read == 0 {
                writeln!(output).context("failed to write output")?;
                break;
            }
            trim_line_ending(&mut line);

            match self.controller.handle_bytes(&line) {
                Ok(TurnOutcome::Ignored) => {
                    summary.ignored += 1;
                }
                Ok(TurnOutcome::Replied { response, result }) => {
                    summary.turns += 1;
                    if result.is_match() {
                        summary.matched += 1;
                        info!(
                            event_name = "chat.turn.matched",
                            session_id = %self.session_id,
                            intent = %result.intent_name,
                            score = result.score,
                            "input matched an intent"
                        );
                    } else {
                        summary.fallbacks += 1;
                        info!(
                            event_name = "chat.turn.fallback",
                            session_id = %self.session_id,
                            score = result.score,
                            "input did not match any intent"
                        );
                    }
                    writeln!(output, "{}{}", self.settings.reply_prefix, response)
                        .context("failed to write reply")?;

                    if self.controller.state() == DialogueState::Stopped {
                        summary.exit_reason = ExitReason::Farewell;
                        break;
                    }
                }
                Err(DialogueError::Intent(IntentError::InvalidInput(reason))) => {
                    summary.ignored += 1;
                    warn!(
                        event_name = "chat.turn.invalid_input",
                        session_id = %self.session_id,
                        reason = %reason,
                        "input line rejected"
                    );
                    writeln!(output, "{}{}", self.settings.reply_prefix, UNREADABLE_LINE)
                        .context("failed to write reply")?;
                }
                Err(error) => {
                    return Err(error).context("dialogue turn failed");
                }
            }
        }

        output.flush().context("failed to flush output")?;
        info!(
            event_name = "chat.session.ended",
            session_id = %self.session_id,
            turns = summary.turns,
            matched = summary.matched,
            fallbacks = summary.fallbacks,
            ignored = summary.ignored,
            exit_reason = ?summary.exit_reason,
            "chat session ended"
        );

        Ok(summary)
    }
}

fn trim_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use parley_core::corpus::{Corpus, Intent};
    use parley_core::matcher::SimilarityMatcher;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{ChatRuntime, ChatSettings, ExitReason};
    use crate::dialogue::{DialogueController, DialogueState};

    const FALLBACK: &str = "I'm sorry, I didn't quite understand that. Could you rephrase?";

    fn runtime() -> ChatRuntime<StdRng> {
        let corpus = Corpus::new(
            vec![
                Intent::new("greeting", vec!["hi".into(), "hello".into()], vec!["Hi!".into()]),
                Intent::new("goodbye", vec!["bye".into()], vec!["Bye!".into()]),
            ],
            Some("goodbye".to_string()),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let controller = DialogueController::new(
            corpus,
            SimilarityMatcher::default(),
            FALLBACK,
            StdRng::seed_from_u64(3),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        ChatRuntime::new(controller, ChatSettings::default())
    }

    fn run(input: &[u8]) -> (super::SessionSummary, String, DialogueState) {
        let mut runtime = runtime();
        let mut output = Vec::new();
        let summary = runtime
            .run(Cursor::new(input.to_vec()), &mut output)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(summary.session_id, runtime.session_id());
        (summary, String::from_utf8_lossy(&output).into_owned(), runtime.state())
    }

    #[test]
    fn conversation_ends_on_farewell() {
        let (summary, output, state) = run(b"hello\n\nasdkjasd\nbye\nhello\n");

        let expected = format!(
            "--- NLP AI Chatbot Initialized ---\nType 'bye' to exit the conversation.\n\
             \nYou: Bot: Hi!\n\nYou: \nYou: Bot: {FALLBACK}\n\nYou: Bot: Bye!\n"
        );
        assert_eq!(output, expected);
        assert_eq!(state, DialogueState::Stopped);
        assert_eq!(summary.exit_reason, ExitReason::Farewell);
        assert_eq!((summary.turns, summary.matched, summary.fallbacks, summary.ignored), (3, 2, 1, 1));
    }

    #[test]
    fn end_of_input_stops_gracefully() {
        let (summary, output, state) = run(b"hi\r\n");
        assert!(output.ends_with("\n\nYou: Bot: Hi!\n\nYou: \n"), "output {output:?}");
        assert_eq!(state, DialogueState::Running);
        assert_eq!(summary.exit_reason, ExitReason::EndOfInput);
        assert_eq!(summary.turns, 1);
    }

    #[test]
    fn undecodable_line_is_reported_and_the_loop_continues() {
        let (summary, output, _) = run(b"\xff\xfe\nbye");
        assert!(output.contains("Bot: I couldn't read that line as text."));
        assert!(output.ends_with("Bot: Bye!\n"));
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.exit_reason, ExitReason::Farewell);
    }
}
