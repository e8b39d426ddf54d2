use std::fmt;
use std::sync::Arc;

use crate::qa::QaSession;
use crate::report::{AnalysisReport, ClassifierRules};
use crate::view_model::AppViewModel;

/// Identifies one document's lifetime. Bumped on every reset so late results
/// from an abandoned document can be recognised and dropped.
pub type Generation = u64;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Extracting,
    Submitting,
    Displaying,
    AskingQuestion,
    Error,
}

impl Phase {
    /// A request is outstanding for the current document.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Phase::Extracting | Phase::Submitting | Phase::AskingQuestion
        )
    }

    /// Input can be edited and submitted.
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::Idle | Phase::Error)
    }

    pub fn has_report(self) -> bool {
        matches!(self, Phase::Displaying | Phase::AskingQuestion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Text,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Submitting,
    Answering,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    PastedText(String),
    UploadedFile(UploadedFile),
}

/// Failure reported by one of the remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceFailure {
    HttpStatus(u16),
    Transport(String),
}

/// Pipeline-level failure for one submission attempt. Distinct from a
/// rejection report, which is a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineFailure {
    Extraction(String),
    Submission(ServiceFailure),
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineFailure::Extraction(message) => {
                write!(f, "Could not read the PDF: {message}")
            }
            PipelineFailure::Submission(ServiceFailure::HttpStatus(code)) => {
                write!(f, "Analysis failed (status {code}). Please try again.")
            }
            PipelineFailure::Submission(ServiceFailure::Transport(message)) => {
                write!(f, "Analysis failed: {message}. Please try again.")
            }
        }
    }
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputProblem {
    EmptyText,
    NoFileSelected,
    NotPdf { media_type: String },
    EmptyExtractedText,
    SignedOut,
    EmptyQuestion,
    QuestionsUnavailable,
    NoReport,
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputProblem::EmptyText => write!(f, "Please enter some text to analyze."),
            InputProblem::NoFileSelected => write!(f, "Please choose a PDF file first."),
            InputProblem::NotPdf { media_type } => {
                write!(f, "Please upload a PDF file (got {media_type}).")
            }
            InputProblem::EmptyExtractedText => {
                write!(f, "No readable text was found in the PDF.")
            }
            InputProblem::SignedOut => write!(f, "Sign in to analyze documents."),
            InputProblem::EmptyQuestion => write!(f, "Please type a question first."),
            InputProblem::QuestionsUnavailable => write!(
                f,
                "Questions are only available for an analyzed legal document."
            ),
            InputProblem::NoReport => write!(f, "There is no report to save yet."),
        }
    }
}

/// What the user is currently composing. Survives failures and resets so a
/// retry does not require re-entering the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct InputDraft {
    pub(crate) mode: InputMode,
    pub(crate) pasted_text: String,
    pub(crate) file: Option<UploadedFile>,
}

impl InputDraft {
    pub(crate) fn source(&self) -> Result<InputSource, InputProblem> {
        match self.mode {
            InputMode::Text => {
                if self.pasted_text.trim().is_empty() {
                    Err(InputProblem::EmptyText)
                } else {
                    Ok(InputSource::PastedText(self.pasted_text.clone()))
                }
            }
            InputMode::Upload => self
                .file
                .clone()
                .map(InputSource::UploadedFile)
                .ok_or(InputProblem::NoFileSelected),
        }
    }
}

/// Everything tied to one document. Replaced wholesale on reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub(crate) generation: Generation,
    pub(crate) phase: Phase,
    pub(crate) source: Option<InputSource>,
    pub(crate) extracted_text: String,
    pub(crate) raw_report: Option<String>,
    pub(crate) report: Option<AnalysisReport>,
    pub(crate) failure: Option<PipelineFailure>,
    pub(crate) stage: Option<Stage>,
    pub(crate) qa: QaSession,
}

impl Session {
    pub(crate) fn fresh(generation: Generation) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source(&self) -> Option<&InputSource> {
        self.source.as_ref()
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// The analysis response body exactly as received.
    pub fn raw_report(&self) -> Option<&str> {
        self.raw_report.as_deref()
    }

    pub fn qa(&self) -> &QaSession {
        &self.qa
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) draft: InputDraft,
    pub(crate) session: Session,
    pub(crate) user: Option<String>,
    pub(crate) rules: ClassifierRules,
    pub(crate) problem: Option<InputProblem>,
    pub(crate) status: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ClassifierRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn view(&self) -> AppViewModel {
        let session = &self.session;
        let phase = session.phase;
        AppViewModel {
            phase,
            generation: session.generation,
            signed_in: self.user.is_some(),
            input_mode: self.draft.mode,
            pasted_text: self.draft.pasted_text.clone(),
            selected_file: self.draft.file.as_ref().map(|file| file.name.clone()),
            stage: session.stage,
            input_problem: self.problem.clone(),
            failure: session.failure.as_ref().map(ToString::to_string),
            report: session.report.clone(),
            history: session.qa.history().to_vec(),
            question_input: session.qa.input().to_string(),
            pending_question: session.qa.pending().map(ToOwned::to_owned),
            qa_error: session.qa.last_error().map(ToOwned::to_owned),
            status: self.status.clone(),
            can_submit: phase.accepts_input() && self.user.is_some(),
            can_ask: phase == Phase::Displaying
                && session
                    .report
                    .as_ref()
                    .is_some_and(|report| !report.is_rejection()),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_problem(&mut self, problem: InputProblem) {
        self.problem = Some(problem);
        self.mark_dirty();
    }

    pub(crate) fn clear_notices(&mut self) {
        self.problem = None;
        self.status = None;
    }
}

/// Declared media type check; parameters such as `; charset=` are ignored.
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .eq_ignore_ascii_case(PDF_MEDIA_TYPE)
}
