pub mod chat;
pub mod classify;
pub mod config;
pub mod doctor;

use parley_core::errors::ApplicationError;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        let class = error.error_class();
        Self::failure(command, class, error.to_string(), exit_code_for(class))
    }

    /// Plain text output with a zero exit code.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

pub fn exit_code_for(error_class: &str) -> u8 {
    match error_class {
        "config_validation" => 2,
        "corpus" => 3,
        "runtime_io" | "invalid_input" => 4,
        _ => 1,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use parley_core::errors::{ApplicationError, IntentError};

    use super::{exit_code_for, CommandResult};

    #[test]
    fn error_payload_carries_class_and_exit_code() {
        let result = CommandResult::from_error(
            "classify",
            &ApplicationError::from(IntentError::InvalidInput("bad bytes".to_string())),
        );
        assert_eq!(result.exit_code, 4);

        let payload: serde_json::Value =
            serde_json::from_str(&result.output).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(payload["command"], "classify");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
    }

    #[test]
    fn unknown_error_classes_exit_with_one() {
        assert_eq!(exit_code_for("config_validation"), 2);
        assert_eq!(exit_code_for("corpus"), 3);
        assert_eq!(exit_code_for("runtime_io"), 4);
        assert_eq!(exit_code_for("doctor"), 1);
    }

    #[test]
    fn text_result_is_a_plain_success() {
        let result = CommandResult::text("intent = greeting");
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "intent = greeting");
    }
}
