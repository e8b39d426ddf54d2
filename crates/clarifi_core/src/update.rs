use std::path::PathBuf;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::{
    classify, is_pdf_media_type, AnalysisReport, AppState, Effect, Generation, InputMode, InputProblem,
    InputSource, Msg, Phase, PipelineFailure, ServiceFailure, Session, Stage, UploadedFile,
    DEFAULT_EXPORT_NAME,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TextChanged(text) => {
            if state.phase().accepts_input() {
                state.draft.pasted_text = text;
                state.clear_notices();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::InputModeChanged(mode) => {
            if state.phase().accepts_input() && state.draft.mode != mode {
                state.draft.mode = mode;
                state.clear_notices();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FileSelected {
            name,
            media_type,
            bytes,
        } => {
            if !is_pdf_media_type(&media_type) {
                engine_info!("Rejected upload {} with media type {}", name, media_type);
                state.set_problem(InputProblem::NotPdf { media_type });
                return (state, Vec::new());
            }
            // A new file is a new document, whatever the current one is doing.
            let effects = if state.phase().accepts_input() {
                Vec::new()
            } else {
                start_new_document(&mut state)
            };
            state.draft.file = Some(UploadedFile {
                name,
                media_type,
                bytes,
            });
            state.draft.mode = InputMode::Upload;
            state.clear_notices();
            state.mark_dirty();
            effects
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::QuestionChanged(question) => {
            if state.phase() == Phase::Displaying {
                state.session.qa.set_input(question);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AskClicked => ask(&mut state),
        Msg::ResetClicked => {
            let effects = start_new_document(&mut state);
            state.clear_notices();
            state.mark_dirty();
            effects
        }
        Msg::ExportClicked { path } => match export_contents(&state.session) {
            Some(contents) => vec![Effect::ExportReport {
                path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME)),
                contents,
            }],
            None => {
                state.set_problem(InputProblem::NoReport);
                Vec::new()
            }
        },
        Msg::UserChanged(user) => {
            if state.user != user {
                let presence = if user.is_some() { "signed in" } else { "signed out" };
                engine_info!("Current user {}", presence);
                state.user = user;
                state.clear_notices();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Progress { generation, stage } => {
            if is_current(&state, generation, "progress") && state.phase().is_in_flight() {
                state.session.stage = Some(stage);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ExtractionFinished { generation, result } => {
            if !is_current(&state, generation, "extraction")
                || state.phase() != Phase::Extracting
            {
                return (state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(text) if text.trim().is_empty() => {
                    engine_warn!("Extraction produced no text");
                    state.session.phase = Phase::Idle;
                    state.session.stage = None;
                    state.problem = Some(InputProblem::EmptyExtractedText);
                    Vec::new()
                }
                Ok(text) => {
                    engine_info!("Extracted {} characters from PDF", text.len());
                    state.session.extracted_text = text.clone();
                    state.session.phase = Phase::Submitting;
                    state.session.stage = Some(Stage::Submitting);
                    vec![Effect::SubmitAnalysis { generation, text }]
                }
                Err(message) => {
                    engine_warn!("Extraction failed: {}", message);
                    fail_pipeline(&mut state, PipelineFailure::Extraction(message));
                    Vec::new()
                }
            }
        }
        Msg::AnalysisFinished { generation, result } => {
            if !is_current(&state, generation, "analysis") || state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(raw) => {
                    let report = classify(&raw, &state.rules);
                    engine_info!("Analysis classified as {}", report.kind_label());
                    state.session.raw_report = Some(raw);
                    state.session.report = Some(report);
                    state.session.phase = Phase::Displaying;
                    state.session.stage = None;
                }
                Err(failure) => {
                    engine_warn!("Analysis submission failed: {:?}", failure);
                    fail_pipeline(&mut state, PipelineFailure::Submission(failure));
                }
            }
            Vec::new()
        }
        Msg::AnswerFinished { generation, result } => {
            if !is_current(&state, generation, "answer") || state.phase() != Phase::AskingQuestion {
                return (state, Vec::new());
            }
            match result {
                Ok(answer) => {
                    state.session.qa.complete(answer);
                }
                Err(failure) => {
                    engine_warn!("Question failed: {:?}", failure);
                    state.session.qa.fail(question_failure_message(&failure));
                }
            }
            state.session.phase = Phase::Displaying;
            state.session.stage = None;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportFinished { result } => {
            state.status = Some(match result {
                Ok(path) => format!("Report saved to {}", path.display()),
                Err(message) => format!("Could not save report: {message}"),
            });
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if !state.phase().accepts_input() {
        engine_debug!("Submit ignored in phase {:?}", state.phase());
        return Vec::new();
    }
    if state.user.is_none() {
        state.set_problem(InputProblem::SignedOut);
        return Vec::new();
    }
    let source = match state.draft.source() {
        Ok(source) => source,
        Err(problem) => {
            state.set_problem(problem);
            return Vec::new();
        }
    };

    // A retry from Error starts clean but keeps the same document generation.
    let generation = state.session.generation;
    state.session = Session::fresh(generation);
    state.clear_notices();
    state.mark_dirty();

    let effect = match &source {
        InputSource::PastedText(text) => {
            state.session.extracted_text = text.clone();
            state.session.phase = Phase::Submitting;
            state.session.stage = Some(Stage::Submitting);
            Effect::SubmitAnalysis {
                generation,
                text: text.clone(),
            }
        }
        InputSource::UploadedFile(file) => {
            state.session.phase = Phase::Extracting;
            state.session.stage = Some(Stage::Extracting);
            Effect::ExtractPdf {
                generation,
                bytes: file.bytes.clone(),
            }
        }
    };
    engine_info!("Session {} entering {:?}", generation, state.session.phase);
    state.session.source = Some(source);
    vec![effect]
}

fn ask(state: &mut AppState) -> Vec<Effect> {
    if state.phase() != Phase::Displaying {
        engine_debug!("Ask ignored in phase {:?}", state.phase());
        return Vec::new();
    }
    let (Some(report), Some(raw_report)) = (&state.session.report, &state.session.raw_report)
    else {
        return Vec::new();
    };
    let rejected = report.is_rejection();
    let raw_report = raw_report.clone();
    if rejected {
        state.set_problem(InputProblem::QuestionsUnavailable);
        return Vec::new();
    }
    let Some(question) = state.session.qa.begin() else {
        state.set_problem(InputProblem::EmptyQuestion);
        return Vec::new();
    };

    state.session.phase = Phase::AskingQuestion;
    state.session.stage = Some(Stage::Answering);
    state.problem = None;
    state.mark_dirty();
    vec![Effect::AskQuestion {
        generation: state.session.generation,
        question,
        original_text: state.session.extracted_text.clone(),
        report: raw_report,
    }]
}

/// Discards the current document. The draft input is kept so the user can
/// edit and resubmit.
fn start_new_document(state: &mut AppState) -> Vec<Effect> {
    let old = state.session.generation;
    let was_in_flight = state.phase().is_in_flight();
    state.session = Session::fresh(old + 1);
    engine_info!("Session {} reset to {}", old, old + 1);
    if was_in_flight {
        vec![Effect::CancelInFlight { generation: old }]
    } else {
        Vec::new()
    }
}

/// Structured reports are saved in readable form; anything else is saved as
/// the service returned it.
fn export_contents(session: &Session) -> Option<String> {
    match session.report.as_ref()? {
        report @ AnalysisReport::Structured { .. } => Some(report.render_text()),
        AnalysisReport::Rejected { .. } | AnalysisReport::PlainText { .. } => {
            session.raw_report.clone()
        }
    }
}

fn fail_pipeline(state: &mut AppState, failure: PipelineFailure) {
    state.session.phase = Phase::Error;
    state.session.stage = None;
    state.session.failure = Some(failure);
}

fn is_current(state: &AppState, generation: Generation, what: &str) -> bool {
    let current = state.session.generation;
    if generation != current {
        engine_debug!(
            "Discarding stale {} result for session {} (current {})",
            what,
            generation,
            current
        );
        return false;
    }
    true
}

fn question_failure_message(failure: &ServiceFailure) -> String {
    match failure {
        ServiceFailure::HttpStatus(code) => {
            format!("Could not get an answer (status {code}). Please try again.")
        }
        ServiceFailure::Transport(message) => {
            format!("Could not get an answer: {message}. Please try again.")
        }
    }
}
