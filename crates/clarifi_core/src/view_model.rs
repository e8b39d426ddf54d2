use crate::{AnalysisReport, Generation, InputMode, InputProblem, Phase, QaRecord, Stage};

/// Default file name for an exported report.
pub const DEFAULT_EXPORT_NAME: &str = "legal-document-analysis.txt";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub generation: Generation,
    pub signed_in: bool,
    pub input_mode: InputMode,
    pub pasted_text: String,
    pub selected_file: Option<String>,
    pub stage: Option<Stage>,
    pub input_problem: Option<InputProblem>,
    /// User-facing message for a failed extraction or submission.
    pub failure: Option<String>,
    pub report: Option<AnalysisReport>,
    pub history: Vec<QaRecord>,
    pub question_input: String,
    pub pending_question: Option<String>,
    pub qa_error: Option<String>,
    pub status: Option<String>,
    pub can_submit: bool,
    pub can_ask: bool,
    pub dirty: bool,
}
