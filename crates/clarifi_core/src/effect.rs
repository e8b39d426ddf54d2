use std::path::PathBuf;
use std::sync::Arc;

use crate::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ExtractPdf {
        generation: Generation,
        bytes: Arc<[u8]>,
    },
    SubmitAnalysis {
        generation: Generation,
        text: String,
    },
    AskQuestion {
        generation: Generation,
        question: String,
        original_text: String,
        report: String,
    },
    /// Abort whatever is still running for an abandoned document.
    CancelInFlight { generation: Generation },
    ExportReport { path: PathBuf, contents: String },
}
