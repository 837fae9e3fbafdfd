use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use url::Url;

use crate::decode::{decode_line, encoding_for_content_type};
use crate::render::MarkdownRenderer;
use crate::stream::{parse_event_line, EventKind, LineBuffer, LineOutcome};
use crate::upload::build_upload_form;
use crate::{
    ApiError, EngineEvent, FailureKind, RenderedMarkdown, RequestId, StreamEvent, StreamSummary,
    UploadReceipt,
};

const ERROR_BODY_LIMIT: usize = 200;

/// Where the service lives and how its endpoints are named.
///
/// No timeouts apply unless configured; a hung request then stays pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub upload_path: String,
    pub upload_field: String,
    pub query_path: String,
    pub enhanced_query_path: String,
    pub health_path: String,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            upload_path: "/api/context".to_string(),
            upload_field: "documents".to_string(),
            query_path: "/api/query".to_string(),
            enhanced_query_path: "/api/enhanced-query".to_string(),
            health_path: "/health".to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl ApiSettings {
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(path))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, format!("{path}: {err}")))
    }
}

pub trait StreamSink: Send + Sync {
    fn emit(&self, event: StreamEvent);
}

/// Forwards stream events to the engine's event channel, tagged with their request.
pub struct ChannelStreamSink {
    request_id: RequestId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelStreamSink {
    pub fn new(request_id: RequestId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { request_id, tx }
    }
}

impl StreamSink for ChannelStreamSink {
    fn emit(&self, event: StreamEvent) {
        let _ = self.tx.send(EngineEvent::Stream {
            request_id: self.request_id,
            event,
        });
    }
}

#[async_trait::async_trait]
pub trait QaApi: Send + Sync {
    async fn upload(&self, files: &[PathBuf]) -> Result<UploadReceipt, ApiError>;

    async fn query(&self, content: &str) -> Result<String, ApiError>;

    /// Streams `context`/`answer` events into `sink` until the body ends.
    async fn enhanced_query(
        &self,
        content: &str,
        sink: &dyn StreamSink,
    ) -> Result<StreamSummary, ApiError>;

    async fn health(&self) -> Result<(), ApiError>;
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    content: &'a str,
}

pub struct ReqwestApi {
    settings: ApiSettings,
    client: reqwest::Client,
    renderer: Arc<dyn MarkdownRenderer>,
}

impl ReqwestApi {
    pub fn new(
        settings: ApiSettings,
        renderer: Arc<dyn MarkdownRenderer>,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            client,
            renderer,
        })
    }

    fn render(&self, markdown: String) -> RenderedMarkdown {
        let html = self.renderer.render(&markdown);
        RenderedMarkdown { markdown, html }
    }

    fn dispatch_line(&self, line: &str, sink: &dyn StreamSink, summary: &mut StreamSummary) {
        match parse_event_line(line) {
            LineOutcome::Ignored => {}
            LineOutcome::Malformed(reason) => {
                summary.skipped += 1;
                engine_warn!("skipping malformed stream event: {}", reason);
            }
            LineOutcome::Event(record) => match record.kind {
                EventKind::Context => {
                    summary.contexts += 1;
                    sink.emit(StreamEvent::Context(self.render(record.content)));
                }
                EventKind::Answer => {
                    summary.answers += 1;
                    sink.emit(StreamEvent::Answer(self.render(record.content)));
                }
            },
        }
    }
}

#[async_trait::async_trait]
impl QaApi for ReqwestApi {
    async fn upload(&self, files: &[PathBuf]) -> Result<UploadReceipt, ApiError> {
        let url = self.settings.endpoint(&self.settings.upload_path)?;
        let form = build_upload_form(&self.settings.upload_field, files).await?;
        engine_info!("uploading {} file(s) to {}", files.len(), url);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        let body = response.text().await.map_err(map_reqwest_error)?;
        let body = serde_json::from_str(&body)
            .map_err(|err| ApiError::new(FailureKind::InvalidBody, err.to_string()))?;
        Ok(UploadReceipt { body })
    }

    async fn query(&self, content: &str) -> Result<String, ApiError> {
        let url = self.settings.endpoint(&self.settings.query_path)?;
        engine_debug!("query to {} ({} chars)", url, content.len());

        let response = self
            .client
            .post(url)
            .json(&QueryRequest { content })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        response.text().await.map_err(map_reqwest_error)
    }

    async fn enhanced_query(
        &self,
        content: &str,
        sink: &dyn StreamSink,
    ) -> Result<StreamSummary, ApiError> {
        let url = self.settings.endpoint(&self.settings.enhanced_query_path)?;
        engine_debug!("enhanced query to {} ({} chars)", url, content.len());

        let response = self
            .client
            .post(url)
            .json(&QueryRequest { content })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        let encoding = encoding_for_content_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );

        let mut summary = StreamSummary::default();
        let mut lines = LineBuffer::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            lines.push(&chunk);
            while let Some(line) = lines.next_line() {
                self.dispatch_line(&decode_line(&line, encoding), sink, &mut summary);
            }
        }
        if let Some(line) = lines.finish() {
            self.dispatch_line(&decode_line(&line, encoding), sink, &mut summary);
        }

        engine_info!(
            "stream finished: {} context(s), {} answer update(s), {} skipped",
            summary.contexts,
            summary.answers,
            summary.skipped
        );
        Ok(summary)
    }

    async fn health(&self) -> Result<(), ApiError> {
        let url = self.settings.endpoint(&self.settings.health_path)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await.map(|_| ())
    }
}

/// Turn a non-2xx response into an error carrying the start of its body, or
/// the canonical reason when the body is empty.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body.chars().take(ERROR_BODY_LIMIT).collect()
    };
    Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
