//! Conversation runtime for the parley chatbot.
//!
//! - [`dialogue::DialogueController`] runs one RUNNING/STOPPED session over an
//!   immutable [`parley_core::Corpus`], picking replies with an injected RNG.
//! - [`runtime::ChatRuntime`] wraps the controller in a line-oriented loop over
//!   any reader/writer pair and reports a [`runtime::SessionSummary`].
//!
//! Turns are strictly sequential. The only blocking point is reading the next
//! input line.

pub mod dialogue;
pub mod runtime;

pub use dialogue::{DialogueController, DialogueError, DialogueState, TurnOutcome};
pub use runtime::{ChatRuntime, ChatSettings, ExitReason, SessionSummary};
