use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use engine_logging::{engine_info, engine_warn};

use crate::api::{ApiSettings, ChannelStreamSink, QaApi, ReqwestApi};
use crate::render::{HighlightingRenderer, MarkdownRenderer};
use crate::{ApiError, EngineEvent, RenderedMarkdown, RequestId, StreamFailure};

enum EngineCommand {
    Upload {
        request_id: RequestId,
        files: Vec<PathBuf>,
    },
    Query {
        request_id: RequestId,
        content: String,
    },
    EnhancedQuery {
        request_id: RequestId,
        content: String,
    },
    Health {
        request_id: RequestId,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineStartError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ApiError),
}

/// Background IO worker. Commands run concurrently on a private tokio runtime;
/// results come back through [`EngineHandle::try_recv`] in completion order.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineStartError> {
        let renderer: Arc<dyn MarkdownRenderer> = Arc::new(HighlightingRenderer);
        let api = Arc::new(ReqwestApi::new(settings, renderer.clone())?);
        Self::with_api(api, renderer)
    }

    pub fn with_api(
        api: Arc<dyn QaApi>,
        renderer: Arc<dyn MarkdownRenderer>,
    ) -> Result<Self, EngineStartError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let renderer = renderer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), renderer.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn upload(&self, request_id: RequestId, files: Vec<PathBuf>) {
        self.send(EngineCommand::Upload { request_id, files });
    }

    pub fn query(&self, request_id: RequestId, content: impl Into<String>) {
        self.send(EngineCommand::Query {
            request_id,
            content: content.into(),
        });
    }

    pub fn enhanced_query(&self, request_id: RequestId, content: impl Into<String>) {
        self.send(EngineCommand::EnhancedQuery {
            request_id,
            content: content.into(),
        });
    }

    pub fn health(&self, request_id: RequestId) {
        self.send(EngineCommand::Health { request_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("engine worker has stopped; command dropped");
        }
    }
}

async fn handle_command(
    api: &dyn QaApi,
    renderer: &dyn MarkdownRenderer,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Upload { request_id, files } => {
            let result = api.upload(&files).await;
            EngineEvent::UploadCompleted { request_id, result }
        }
        EngineCommand::Query {
            request_id,
            content,
        } => {
            let result = api.query(&content).await;
            EngineEvent::QueryCompleted { request_id, result }
        }
        EngineCommand::EnhancedQuery {
            request_id,
            content,
        } => {
            let sink = ChannelStreamSink::new(request_id, event_tx.clone());
            let result = api
                .enhanced_query(&content, &sink)
                .await
                .map_err(|error| render_failure(renderer, error));
            EngineEvent::EnhancedQueryCompleted { request_id, result }
        }
        EngineCommand::Health { request_id } => {
            let result = api.health().await;
            EngineEvent::HealthChecked { request_id, result }
        }
    };
    engine_info!("request {} settled", event_request_id(&event));
    let _ = event_tx.send(event);
}

fn render_failure(renderer: &dyn MarkdownRenderer, error: ApiError) -> StreamFailure {
    let markdown = format!("Error: {error}");
    let html = renderer.render(&markdown);
    StreamFailure {
        error,
        rendered: RenderedMarkdown { markdown, html },
    }
}

fn event_request_id(event: &EngineEvent) -> RequestId {
    match event {
        EngineEvent::UploadCompleted { request_id, .. }
        | EngineEvent::QueryCompleted { request_id, .. }
        | EngineEvent::Stream { request_id, .. }
        | EngineEvent::EnhancedQueryCompleted { request_id, .. }
        | EngineEvent::HealthChecked { request_id, .. } => *request_id,
    }
}
