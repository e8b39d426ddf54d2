use std::sync::{Arc, Once};

use clarifi_core::{
    update, AnalysisReport, AppState, Effect, InputMode, InputProblem, InputSource, Msg, Phase,
    ServiceFailure, Stage,
};

const STRUCTURED: &str = r#"{"summary":"A lease.","risks":["Early exit fee"],"keyTerms":[{"term":"Indemnity","explanation":"You cover their losses."}]}"#;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn signed_in() -> AppState {
    let (state, _) = update(AppState::new(), Msg::UserChanged(Some("ada".to_string())));
    state
}

fn submit_text(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::TextChanged(text.to_string()));
    update(state, Msg::SubmitClicked)
}

fn select_file(state: AppState, name: &str, media_type: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FileSelected {
            name: name.to_string(),
            media_type: media_type.to_string(),
            bytes: Arc::from(&b"%PDF-1.4 fake"[..]),
        },
    )
}

#[test]
fn pasted_text_goes_straight_to_submission() {
    init_logging();
    let (mut state, effects) = submit_text(signed_in(), "This agreement is made between...");

    assert_eq!(
        effects,
        vec![Effect::SubmitAnalysis {
            generation: 0,
            text: "This agreement is made between...".to_string(),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.stage, Some(Stage::Submitting));
    assert!(!view.can_submit);
    assert_eq!(
        state.session().source(),
        Some(&InputSource::PastedText(
            "This agreement is made between...".to_string()
        ))
    );
    assert!(state.consume_dirty());
}

#[test]
fn structured_response_is_displayed() {
    init_logging();
    let (state, _) = submit_text(signed_in(), "This agreement ...");
    let (state, effects) = update(
        state,
        Msg::AnalysisFinished {
            generation: 0,
            result: Ok(STRUCTURED.to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Displaying);
    assert!(view.can_ask);
    match view.report {
        Some(AnalysisReport::Structured { key_terms, .. }) => {
            assert_eq!(key_terms[0].term, "Indemnity");
        }
        other => panic!("expected structured report, got {other:?}"),
    }
}

#[test]
fn rejection_is_displayed_not_failed() {
    init_logging();
    let (state, _) = submit_text(signed_in(), "banana bread recipe");
    let (state, _) = update(
        state,
        Msg::AnalysisFinished {
            generation: 0,
            result: Ok(r#"{"error":"Input is not related to a Legal Document"}"#.to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Displaying);
    assert_eq!(view.failure, None);
    assert_eq!(
        view.report,
        Some(AnalysisReport::Rejected {
            message: "Input is not related to a Legal Document".to_string()
        })
    );
    assert!(!view.can_ask);
}

#[test]
fn blank_text_is_rejected_without_request() {
    init_logging();
    let (mut state, effects) = submit_text(signed_in(), "   \n\t ");

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().input_problem, Some(InputProblem::EmptyText));
    assert!(state.consume_dirty());
}

#[test]
fn signed_out_user_cannot_submit() {
    init_logging();
    let (state, effects) = submit_text(AppState::new(), "This agreement ...");

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().input_problem, Some(InputProblem::SignedOut));
    assert!(!state.view().can_submit);
}

#[test]
fn non_pdf_upload_is_rejected_before_extraction() {
    init_logging();
    let docx = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
    let (state, effects) = select_file(signed_in(), "lease.docx", docx);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.input_problem,
        Some(InputProblem::NotPdf {
            media_type: docx.to_string()
        })
    );
    assert_eq!(view.selected_file, None);

    let (state, _) = update(state, Msg::InputModeChanged(InputMode::Upload));
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(
        state.view().input_problem,
        Some(InputProblem::NoFileSelected)
    );
}

#[test]
fn pdf_upload_extracts_then_submits_extracted_text() {
    init_logging();
    let (state, effects) = select_file(signed_in(), "lease.pdf", "application/pdf");
    assert!(effects.is_empty());
    assert_eq!(state.view().input_mode, InputMode::Upload);
    assert_eq!(state.view().selected_file.as_deref(), Some("lease.pdf"));

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(state.phase(), Phase::Extracting);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ExtractPdf { generation: 0, .. }]
    ));

    let (state, effects) = update(
        state,
        Msg::ExtractionFinished {
            generation: 0,
            result: Ok("Page one\nPage two\n".to_string()),
        },
    );
    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(state.session().extracted_text(), "Page one\nPage two\n");
    assert_eq!(
        effects,
        vec![Effect::SubmitAnalysis {
            generation: 0,
            text: "Page one\nPage two\n".to_string(),
        }]
    );
}

#[test]
fn media_type_parameters_are_ignored() {
    init_logging();
    let (state, _) = select_file(signed_in(), "lease.pdf", "Application/PDF; name=lease.pdf");

    assert_eq!(state.view().input_problem, None);
    assert_eq!(state.view().selected_file.as_deref(), Some("lease.pdf"));
}

#[test]
fn empty_extracted_text_returns_to_idle() {
    init_logging();
    let (state, _) = select_file(signed_in(), "scan.pdf", "application/pdf");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(
        state,
        Msg::ExtractionFinished {
            generation: 0,
            result: Ok(" \n \n".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(
        state.view().input_problem,
        Some(InputProblem::EmptyExtractedText)
    );
}

#[test]
fn extraction_failure_keeps_file_for_retry() {
    init_logging();
    let (state, _) = select_file(signed_in(), "broken.pdf", "application/pdf");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = update(
        state,
        Msg::ExtractionFinished {
            generation: 0,
            result: Err("not a PDF".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Error);
    assert_eq!(
        view.failure.as_deref(),
        Some("Could not read the PDF: not a PDF")
    );
    assert_eq!(view.selected_file.as_deref(), Some("broken.pdf"));
    assert!(view.can_submit);

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(state.phase(), Phase::Extracting);
    assert_eq!(state.view().failure, None);
    assert_eq!(effects.len(), 1);
}

#[test]
fn server_error_moves_to_error_with_input_intact() {
    init_logging();
    let (state, _) = submit_text(signed_in(), "This agreement ...");
    let (state, effects) = update(
        state,
        Msg::AnalysisFinished {
            generation: 0,
            result: Err(ServiceFailure::HttpStatus(500)),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Error);
    assert_eq!(
        view.failure.as_deref(),
        Some("Analysis failed (status 500). Please try again.")
    );
    assert_eq!(view.pasted_text, "This agreement ...");
    assert_eq!(view.report, None);

    let (_, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitAnalysis {
            generation: 0,
            text: "This agreement ...".to_string(),
        }]
    );
}

#[test]
fn input_edits_are_ignored_while_submitting() {
    init_logging();
    let (state, _) = submit_text(signed_in(), "first");
    let (state, effects) = update(state, Msg::TextChanged("second".to_string()));
    let (state, more) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert!(more.is_empty());
    assert_eq!(state.view().pasted_text, "first");
}

#[test]
fn reset_while_submitting_cancels_and_drops_late_result() {
    init_logging();
    let (state, _) = submit_text(signed_in(), "This agreement ...");
    let (state, effects) = update(state, Msg::ResetClicked);

    assert_eq!(effects, vec![Effect::CancelInFlight { generation: 0 }]);
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().generation, 1);

    let (mut state, effects) = update(
        state,
        Msg::AnalysisFinished {
            generation: 0,
            result: Ok(STRUCTURED.to_string()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    let (mut state, _) = update(
        state,
        Msg::Progress {
            generation: 0,
            stage: Stage::Submitting,
        },
    );
    assert!(!state.consume_dirty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.report, None);
    assert_eq!(view.stage, None);
}

#[test]
fn reset_when_idle_emits_nothing() {
    init_logging();
    let (state, effects) = update(signed_in(), Msg::ResetClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().generation, 1);
}

#[test]
fn new_file_during_extraction_starts_new_document() {
    init_logging();
    let (state, _) = select_file(signed_in(), "a.pdf", "application/pdf");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = select_file(state, "b.pdf", "application/pdf");

    assert_eq!(effects, vec![Effect::CancelInFlight { generation: 0 }]);
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().selected_file.as_deref(), Some("b.pdf"));

    let (state, effects) = update(
        state,
        Msg::ExtractionFinished {
            generation: 0,
            result: Ok("stale text".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.session().extracted_text(), "");

    let (_, effects) = update(state, Msg::SubmitClicked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ExtractPdf { generation: 1, .. }]
    ));
}

#[test]
fn progress_is_ignored_once_displaying() {
    init_logging();
    let (state, _) = submit_text(signed_in(), "This agreement ...");
    let (mut state, _) = update(
        state,
        Msg::AnalysisFinished {
            generation: 0,
            result: Ok("Plain report".to_string()),
        },
    );
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::Progress {
            generation: 0,
            stage: Stage::Submitting,
        },
    );

    assert!(!state.consume_dirty());
    assert_eq!(state.view().stage, None);
}
