use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{AnalysisClient, QaClient, ReqwestServiceClient};
use crate::extract::{LopdfExtractor, TextExtractor};
use crate::{ClientError, EndpointConfig, EngineEvent, ExtractionError, Generation, Stage};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ClientError),
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Extract {
        generation: Generation,
        bytes: Arc<[u8]>,
    },
    Submit {
        generation: Generation,
        text: String,
    },
    Ask {
        generation: Generation,
        question: String,
        original_text: String,
        report: String,
    },
    Cancel {
        generation: Generation,
    },
}

impl EngineCommand {
    fn generation(&self) -> Generation {
        match self {
            EngineCommand::Extract { generation, .. }
            | EngineCommand::Submit { generation, .. }
            | EngineCommand::Ask { generation, .. }
            | EngineCommand::Cancel { generation } => *generation,
        }
    }
}

#[derive(Clone)]
struct Services {
    extractor: Arc<dyn TextExtractor>,
    analysis: Arc<dyn AnalysisClient>,
    qa: Arc<dyn QaClient>,
}

/// Runs extraction and endpoint calls on a background tokio runtime. Commands
/// go in, `EngineEvent`s come out; the caller never blocks on IO.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EndpointConfig) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestServiceClient::new(config)?);
        Self::with_services(Arc::new(LopdfExtractor), client.clone(), client)
    }

    pub fn with_services(
        extractor: Arc<dyn TextExtractor>,
        analysis: Arc<dyn AnalysisClient>,
        qa: Arc<dyn QaClient>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let services = Services {
            extractor,
            analysis,
            qa,
        };

        thread::spawn(move || {
            let mut tokens: HashMap<Generation, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                let generation = command.generation();
                if let EngineCommand::Cancel { .. } = command {
                    if let Some(token) = tokens.remove(&generation) {
                        engine_info!("Cancelling work for session {}", generation);
                        token.cancel();
                    }
                    continue;
                }

                // Older generations are abandoned documents.
                tokens.retain(|known, token| {
                    if *known < generation {
                        token.cancel();
                        false
                    } else {
                        true
                    }
                });
                let token = tokens
                    .entry(generation)
                    .or_insert_with(CancellationToken::new)
                    .clone();

                let services = services.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {
                            engine_debug!("Dropped cancelled command for session {}", generation);
                        }
                        _ = handle_command(&services, command, event_tx) => {}
                    }
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn extract(&self, generation: Generation, bytes: Arc<[u8]>) {
        self.send(EngineCommand::Extract { generation, bytes });
    }

    pub fn submit(&self, generation: Generation, text: impl Into<String>) {
        self.send(EngineCommand::Submit {
            generation,
            text: text.into(),
        });
    }

    pub fn ask(
        &self,
        generation: Generation,
        question: impl Into<String>,
        original_text: impl Into<String>,
        report: impl Into<String>,
    ) {
        self.send(EngineCommand::Ask {
            generation,
            question: question.into(),
            original_text: original_text.into(),
            report: report.into(),
        });
    }

    pub fn cancel(&self, generation: Generation) {
        self.send(EngineCommand::Cancel { generation });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(
    services: &Services,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelProgressSink::new(event_tx);
    match command {
        EngineCommand::Extract { generation, bytes } => {
            sink.emit(EngineEvent::Progress {
                generation,
                stage: Stage::Extracting,
            });
            let extractor = services.extractor.clone();
            let result = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
                .await
                .unwrap_or_else(|err| Err(ExtractionError::Unreadable(err.to_string())));
            sink.emit(EngineEvent::ExtractionCompleted { generation, result });
        }
        EngineCommand::Submit { generation, text } => {
            sink.emit(EngineEvent::Progress {
                generation,
                stage: Stage::Submitting,
            });
            engine_info!("Submitting {} characters for session {}", text.len(), generation);
            let result = services.analysis.submit(&text).await;
            sink.emit(EngineEvent::AnalysisCompleted { generation, result });
        }
        EngineCommand::Ask {
            generation,
            question,
            original_text,
            report,
        } => {
            sink.emit(EngineEvent::Progress {
                generation,
                stage: Stage::Answering,
            });
            let asked_at = chrono::Utc::now();
            let result = services.qa.ask(&question, &original_text, &report).await;
            sink.emit(EngineEvent::AnswerCompleted {
                generation,
                asked_at,
                result,
            });
        }
        EngineCommand::Cancel { .. } => {}
    }
}
