use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use docqa_core::{Effect, Msg, RenderedText};
use docqa_engine::{EngineEvent, EngineHandle, RenderedMarkdown, StreamEvent};
use engine_logging::{engine_error, engine_info, engine_warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Executes controller effects on the engine and feeds engine results back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadFiles { request_id, files } => {
                    engine_info!("UploadFiles request_id={} files={}", request_id, files.len());
                    self.engine.upload(request_id, files);
                }
                Effect::SubmitQuery {
                    request_id,
                    content,
                } => {
                    engine_info!("SubmitQuery request_id={} len={}", request_id, content.len());
                    self.engine.query(request_id, content);
                }
                Effect::StreamEnhancedQuery {
                    request_id,
                    content,
                } => {
                    engine_info!(
                        "StreamEnhancedQuery request_id={} len={}",
                        request_id,
                        content.len()
                    );
                    self.engine.enhanced_query(request_id, content);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.try_recv() else {
                thread::sleep(POLL_INTERVAL);
                continue;
            };
            let Some(msg) = map_event(event) else {
                continue;
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::UploadCompleted { request_id, result } => Msg::UploadFinished {
            request_id,
            result: result.map(|_| ()).map_err(|err| {
                engine_warn!("Upload {} failed: {}", request_id, err);
                format!("Upload failed: {err}")
            }),
        },
        EngineEvent::QueryCompleted { request_id, result } => Msg::QueryFinished {
            request_id,
            // Only the log sees a failed simple query; the view keeps its old response.
            result: result.map_err(|err| {
                engine_error!("Query error: {}", err);
                err.to_string()
            }),
        },
        EngineEvent::Stream { request_id, event } => match event {
            StreamEvent::Context(text) => Msg::ContextReceived {
                request_id,
                context: to_core(text),
            },
            StreamEvent::Answer(text) => Msg::AnswerReceived {
                request_id,
                answer: to_core(text),
            },
        },
        EngineEvent::EnhancedQueryCompleted { request_id, result } => {
            let failure = match result {
                Ok(summary) => {
                    engine_info!(
                        "Enhanced query {} done: {} contexts, {} skipped",
                        request_id,
                        summary.contexts,
                        summary.skipped
                    );
                    None
                }
                Err(failure) => {
                    engine_warn!("Enhanced query {} failed: {}", request_id, failure.error);
                    Some(to_core(failure.rendered))
                }
            };
            Msg::EnhancedQueryFinished {
                request_id,
                failure,
            }
        }
        EngineEvent::HealthChecked { request_id, .. } => {
            engine_warn!("Unexpected health result for request {}", request_id);
            return None;
        }
    };
    Some(msg)
}

fn to_core(text: RenderedMarkdown) -> RenderedText {
    RenderedText {
        markdown: text.markdown,
        html: text.html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_engine::{ApiError, FailureKind, StreamFailure, StreamSummary};

    fn api_error(code: u16) -> ApiError {
        ApiError {
            kind: FailureKind::HttpStatus(code),
            message: "Internal Server Error".to_string(),
        }
    }

    #[test]
    fn upload_failure_becomes_user_message() {
        let msg = map_event(EngineEvent::UploadCompleted {
            request_id: 3,
            result: Err(api_error(500)),
        });
        assert_eq!(
            msg,
            Some(Msg::UploadFinished {
                request_id: 3,
                result: Err("Upload failed: http status 500: Internal Server Error".to_string()),
            })
        );
    }

    #[test]
    fn stream_failure_carries_rendered_error() {
        let rendered = RenderedMarkdown {
            markdown: "Error: boom".to_string(),
            html: "<p>Error: boom</p>\n".to_string(),
        };
        let msg = map_event(EngineEvent::EnhancedQueryCompleted {
            request_id: 9,
            result: Err(StreamFailure {
                error: api_error(502),
                rendered,
            }),
        });
        assert_eq!(
            msg,
            Some(Msg::EnhancedQueryFinished {
                request_id: 9,
                failure: Some(RenderedText::new("Error: boom", "<p>Error: boom</p>\n")),
            })
        );
    }

    #[test]
    fn successful_stream_has_no_failure() {
        let msg = map_event(EngineEvent::EnhancedQueryCompleted {
            request_id: 1,
            result: Ok(StreamSummary::default()),
        });
        assert_eq!(
            msg,
            Some(Msg::EnhancedQueryFinished {
                request_id: 1,
                failure: None,
            })
        );
    }
}
