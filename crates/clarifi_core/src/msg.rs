use std::path::PathBuf;
use std::sync::Arc;

use crate::{Answer, Generation, InputMode, ServiceFailure, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the pasted document text.
    TextChanged(String),
    /// User switched between the paste and upload tabs.
    InputModeChanged(InputMode),
    /// User picked a file. Selecting a file starts a new document.
    FileSelected {
        name: String,
        media_type: String,
        bytes: Arc<[u8]>,
    },
    /// User asked for the current input to be analyzed.
    SubmitClicked,
    /// User edited the follow-up question.
    QuestionChanged(String),
    /// User submitted the follow-up question.
    AskClicked,
    /// User started a new analysis.
    ResetClicked,
    /// User asked to save the displayed report.
    ExportClicked { path: Option<PathBuf> },
    /// Authentication collaborator changed the current user.
    UserChanged(Option<String>),
    /// Engine progress for the current document.
    Progress { generation: Generation, stage: Stage },
    /// Engine finished reading the PDF.
    ExtractionFinished {
        generation: Generation,
        result: Result<String, String>,
    },
    /// Engine received the analysis endpoint's response.
    AnalysisFinished {
        generation: Generation,
        result: Result<String, ServiceFailure>,
    },
    /// Engine received the question endpoint's response.
    AnswerFinished {
        generation: Generation,
        result: Result<Answer, ServiceFailure>,
    },
    /// Report export completed.
    ExportFinished { result: Result<PathBuf, String> },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
