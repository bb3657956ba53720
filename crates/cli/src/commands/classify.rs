use parley_core::config::{AppConfig, LoadOptions};
use parley_core::errors::ApplicationError;
use parley_core::matcher::{MatchResult, PhraseScore};
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ClassifyReport {
    command: &'static str,
    status: &'static str,
    input: String,
    normalized: Vec<String>,
    threshold: f64,
    result: MatchResult,
    phrases: Vec<PhraseScore>,
}

pub fn run(options: LoadOptions, text: &str, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("classify", &ApplicationError::from(error)),
    };
    classify(&config, text, json_output)
}

pub fn classify(config: &AppConfig, text: &str, json_output: bool) -> CommandResult {
    match build_report(config, text) {
        Ok(report) if json_output => {
            CommandResult::text(serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
                format!(
                    "{{\"command\":\"classify\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                    error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
                )
            }))
        }
        Ok(report) => CommandResult::text(render_human(&report)),
        Err(error) => CommandResult::from_error("classify", &error),
    }
}

fn build_report(config: &AppConfig, text: &str) -> Result<ClassifyReport, ApplicationError> {
    let corpus = config.load_corpus()?;
    let matcher = config.matcher();
    let result = matcher.match_text(text, &corpus)?;
    let phrases = matcher.score_all(text, &corpus)?;

    Ok(ClassifyReport {
        command: "classify",
        status: "ok",
        input: text.to_string(),
        normalized: matcher.normalizer().normalize(text),
        threshold: matcher.threshold(),
        result,
        phrases,
    })
}

fn render_human(report: &ClassifyReport) -> String {
    let mut lines = vec![format!(
        "intent = {} (score {:.4}, threshold {:.2}{})",
        report.result.intent_name,
        report.result.score,
        report.threshold,
        if report.result.is_terminal { ", terminal" } else { "" }
    )];
    lines.push(format!("normalized = [{}]", report.normalized.join(", ")));

    let mut ranked = report.phrases.iter().filter(|phrase| phrase.score > 0.0).collect::<Vec<_>>();
    ranked.sort_by(|left, right| right.score.total_cmp(&left.score).then(left.position.cmp(&right.position)));
    for phrase in ranked.into_iter().take(5) {
        lines.push(format!("- {:.4} {:?} ({})", phrase.score, phrase.phrase, phrase.intent));
    }

    lines.join("\n")
}
