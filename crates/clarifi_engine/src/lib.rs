//! Clarifi engine: PDF text extraction, endpoint clients and effect execution.
mod client;
mod config;
mod engine;
mod export;
mod extract;
mod types;

pub use client::{AnalysisClient, QaClient, ReqwestServiceClient};
pub use config::EndpointConfig;
pub use engine::{ChannelProgressSink, EngineError, EngineHandle, ProgressSink};
pub use export::{export_report, ExportError};
pub use extract::{assemble_text, ExtractionError, LopdfExtractor, PageTextLayer, TextExtractor};
pub use types::{ClientError, EngineEvent, FailureKind, Generation, Stage};
