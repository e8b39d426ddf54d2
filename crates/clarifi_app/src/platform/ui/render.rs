use clarifi_core::{AppViewModel, InputMode, Phase, Stage};

/// Turns successive view models into terminal output. Only what changed since
/// the previous view is printed, so the transcript reads like a log.
#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<AppViewModel>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let prev = self.last.take().unwrap_or_default();
        let mut lines = Vec::new();

        if view.signed_in != prev.signed_in {
            lines.push(if view.signed_in {
                "Signed in.".to_string()
            } else {
                "Signed out. Sign in to analyze documents.".to_string()
            });
        }

        if view.generation != prev.generation {
            lines.push("Started a new document.".to_string());
        }

        if view.input_mode != prev.input_mode {
            let label = match view.input_mode {
                InputMode::Text => "pasted text",
                InputMode::Upload => "PDF upload",
            };
            lines.push(format!("Input: {label}"));
        }
        if view.selected_file != prev.selected_file {
            if let Some(name) = &view.selected_file {
                lines.push(format!("Selected {name}"));
            }
        }
        if view.pasted_text != prev.pasted_text && !view.pasted_text.is_empty() {
            lines.push(format!(
                "Captured {} characters of text.",
                view.pasted_text.chars().count()
            ));
        }

        if view.stage != prev.stage {
            if let Some(stage) = view.stage {
                lines.push(stage_label(stage).to_string());
            }
        }

        if view.input_problem != prev.input_problem {
            if let Some(problem) = &view.input_problem {
                lines.push(problem.to_string());
            }
        }
        if view.failure != prev.failure {
            if let Some(failure) = &view.failure {
                lines.push(failure.clone());
            }
        }

        if view.report != prev.report {
            if let Some(report) = &view.report {
                lines.push(String::new());
                lines.extend(report.render_text().lines().map(str::to_string));
                lines.push(String::new());
                if view.can_ask {
                    lines.push(
                        "Ask a question about this document, or :save to keep the report."
                            .to_string(),
                    );
                }
            }
        }

        // History is append-only within a document; a new document starts over.
        let seen = if view.generation == prev.generation {
            prev.history.len().min(view.history.len())
        } else {
            0
        };
        for record in &view.history[seen..] {
            lines.push(format!("Q: {}", record.question));
            lines.push(format!("A: {}", record.answer));
        }

        if view.qa_error != prev.qa_error {
            if let Some(message) = &view.qa_error {
                lines.push(message.clone());
            }
        }
        if view.status != prev.status {
            if let Some(status) = &view.status {
                lines.push(status.clone());
            }
        }

        if view.phase != prev.phase && view.phase == Phase::Idle && view.can_submit {
            if prev.phase.is_in_flight() || view.generation != prev.generation {
                lines.push("Ready. Use :paste or :open, then :analyze.".to_string());
            }
        }

        self.last = Some(view.clone());
        lines
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Extracting => "Extracting text from the PDF...",
        Stage::Submitting => "Analyzing document...",
        Stage::Answering => "Getting an answer...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clarifi_core::{AnalysisReport, InputProblem, QaRecord};

    fn displaying() -> AppViewModel {
        AppViewModel {
            phase: Phase::Displaying,
            signed_in: true,
            report: Some(AnalysisReport::PlainText {
                body: "All clear.".to_string(),
            }),
            can_ask: true,
            ..AppViewModel::default()
        }
    }

    fn record(question: &str) -> QaRecord {
        QaRecord {
            question: question.to_string(),
            answer: format!("answer to {question}"),
            asked_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn unchanged_view_prints_nothing() {
        let mut renderer = Renderer::new();
        let view = displaying();
        renderer.render(&view);

        assert!(renderer.render(&view).is_empty());
    }

    #[test]
    fn report_is_printed_once() {
        let mut renderer = Renderer::new();
        let first = renderer.render(&displaying());

        assert!(first.iter().any(|line| line == "All clear."));
        assert!(first.iter().any(|line| line.starts_with("Ask a question")));

        let mut next = displaying();
        next.status = Some("Report saved to out.txt".to_string());
        assert_eq!(renderer.render(&next), vec!["Report saved to out.txt"]);
    }

    #[test]
    fn only_new_history_entries_are_printed() {
        let mut renderer = Renderer::new();
        let mut view = displaying();
        view.history = vec![record("first")];
        renderer.render(&view);

        view.history.push(record("second"));
        assert_eq!(
            renderer.render(&view),
            vec!["Q: second", "A: answer to second"]
        );
    }

    #[test]
    fn stage_and_problem_are_reported() {
        let mut renderer = Renderer::new();
        let view = AppViewModel {
            phase: Phase::Extracting,
            signed_in: true,
            stage: Some(Stage::Extracting),
            ..AppViewModel::default()
        };
        let lines = renderer.render(&view);
        assert!(lines.contains(&"Extracting text from the PDF...".to_string()));

        let view = AppViewModel {
            input_problem: Some(InputProblem::EmptyExtractedText),
            can_submit: true,
            ..view.clone()
        };
        let view = AppViewModel {
            phase: Phase::Idle,
            stage: None,
            ..view
        };
        let lines = renderer.render(&view);
        assert!(lines.contains(&"No readable text was found in the PDF.".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("Ready.")));
    }
}
