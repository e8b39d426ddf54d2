//! Clarifi core: pure document-analysis session state machine, response
//! classification and view-model helpers.
mod effect;
mod msg;
mod qa;
mod report;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use qa::{Answer, QaRecord, QaSession};
pub use report::{classify, AnalysisReport, ClassifierRules, KeyTerm, DEFAULT_REJECTION_MARKER};
pub use state::{
    is_pdf_media_type, AppState, Generation, InputMode, InputProblem, InputSource, Phase,
    PipelineFailure, ServiceFailure, Session, Stage, UploadedFile, PDF_MEDIA_TYPE,
};
pub use update::update;
pub use view_model::{AppViewModel, DEFAULT_EXPORT_NAME};
