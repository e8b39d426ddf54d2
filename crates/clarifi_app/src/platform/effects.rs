use std::time::Duration;

use clarifi_core::{Answer, Effect, Msg, ServiceFailure, Stage};
use clarifi_engine::{export_report, ClientError, EngineEvent, EngineHandle, FailureKind};
use engine_logging::{engine_info, engine_warn};

/// Executes core effects against the engine and turns engine events back into
/// core messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Starts every effect. Effects that finish synchronously return their
    /// completion message immediately.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::ExtractPdf { generation, bytes } => {
                    engine_info!("ExtractPdf session={} bytes={}", generation, bytes.len());
                    self.engine.extract(generation, bytes);
                }
                Effect::SubmitAnalysis { generation, text } => {
                    engine_info!("SubmitAnalysis session={} chars={}", generation, text.len());
                    self.engine.submit(generation, text);
                }
                Effect::AskQuestion {
                    generation,
                    question,
                    original_text,
                    report,
                } => {
                    engine_info!(
                        "AskQuestion session={} question_len={}",
                        generation,
                        question.len()
                    );
                    self.engine.ask(generation, question, original_text, report);
                }
                Effect::CancelInFlight { generation } => {
                    self.engine.cancel(generation);
                }
                Effect::ExportReport { path, contents } => {
                    let result = export_report(&path, &contents).map_err(|err| {
                        engine_warn!("Export to {:?} failed: {}", path, err);
                        err.to_string()
                    });
                    immediate.push(Msg::ExportFinished { result });
                }
            }
        }
        immediate
    }

    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    pub fn wait(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { generation, stage } => Msg::Progress {
            generation,
            stage: map_stage(stage),
        },
        EngineEvent::ExtractionCompleted { generation, result } => Msg::ExtractionFinished {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::AnalysisCompleted { generation, result } => Msg::AnalysisFinished {
            generation,
            result: result.map_err(map_failure),
        },
        EngineEvent::AnswerCompleted {
            generation,
            asked_at,
            result,
        } => Msg::AnswerFinished {
            generation,
            result: result
                .map(|text| Answer { text, asked_at })
                .map_err(map_failure),
        },
    }
}

fn map_stage(stage: clarifi_engine::Stage) -> Stage {
    match stage {
        clarifi_engine::Stage::Extracting => Stage::Extracting,
        clarifi_engine::Stage::Submitting => Stage::Submitting,
        clarifi_engine::Stage::Answering => Stage::Answering,
    }
}

fn map_failure(err: ClientError) -> ServiceFailure {
    match err.kind {
        FailureKind::HttpStatus(code) => ServiceFailure::HttpStatus(code),
        _ => ServiceFailure::Transport(err.to_string()),
    }
}
