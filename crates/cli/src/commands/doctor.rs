use parley_core::config::{AppConfig, LoadOptions};
use parley_core::corpus::Corpus;
use parley_core::matcher::{stop_words, SimilarityMatcher};
use serde::Serialize;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match config.load_corpus() {
                Ok(corpus) => {
                    checks.push(check_corpus(&corpus, config.corpus.path.is_some()));
                    checks.push(check_reachability(&corpus, &config.matcher()));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "corpus_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("intent_reachability", "corpus did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("corpus_load", "configuration did not load"));
            checks.push(skipped("intent_reachability", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

fn check_corpus(corpus: &Corpus, from_file: bool) -> DoctorCheck {
    if let Err(error) = corpus.ensure_non_empty() {
        return DoctorCheck { name: "corpus_load", status: CheckStatus::Fail, details: error.to_string() };
    }

    let origin = if from_file { "file" } else { "builtin" };
    DoctorCheck {
        name: "corpus_load",
        status: CheckStatus::Pass,
        details: format!(
            "{origin} corpus with {} intents and {} phrases (terminal intent: {})",
            corpus.intents().len(),
            corpus.all_example_phrases().len(),
            corpus.terminal_intent().unwrap_or("<none>")
        ),
    }
}

/// Every intent needs at least one phrase that classifies back to it.
fn check_reachability(corpus: &Corpus, matcher: &SimilarityMatcher) -> DoctorCheck {
    let stop_words = stop_words::english();
    let mut unreachable = Vec::new();
    let mut silent_phrases = Vec::new();

    for intent in corpus.intents() {
        let mut reachable = false;
        for phrase in &intent.patterns {
            let tokens = matcher.normalizer().normalize(phrase);
            if tokens.iter().all(|token| stop_words.contains(token.as_str())) {
                silent_phrases.push(format!("{:?} ({})", phrase, intent.name));
                continue;
            }
            if matches!(matcher.match_text(phrase, corpus), Ok(result) if result.intent_name == intent.name)
            {
                reachable = true;
            }
        }
        if !reachable {
            unreachable.push(intent.name.clone());
        }
    }

    let mut details = if unreachable.is_empty() {
        format!("all {} intents are reachable from their own phrases", corpus.intents().len())
    } else {
        format!("unreachable intents: {}", unreachable.join(", "))
    };
    if !silent_phrases.is_empty() {
        details.push_str(&format!(
            "; phrases with no vocabulary after stop-word removal: {}",
            silent_phrases.join(", ")
        ));
    }

    DoctorCheck {
        name: "intent_reachability",
        status: if unreachable.is_empty() { CheckStatus::Pass } else { CheckStatus::Fail },
        details,
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
