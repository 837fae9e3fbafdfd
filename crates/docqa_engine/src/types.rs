use std::fmt;

pub type RequestId = u64;

/// Markdown source paired with its rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedMarkdown {
    pub markdown: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A retrieved passage; contexts accumulate.
    Context(RenderedMarkdown),
    /// The full answer so far; supersedes any earlier answer.
    Answer(RenderedMarkdown),
}

/// Counters for one consumed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    pub contexts: usize,
    pub answers: usize,
    pub skipped: usize,
}

/// A failed streaming query together with the error text rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFailure {
    pub error: ApiError,
    pub rendered: RenderedMarkdown,
}

/// Parsed body of a successful upload. The server's fields are not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted {
        request_id: RequestId,
        result: Result<UploadReceipt, ApiError>,
    },
    QueryCompleted {
        request_id: RequestId,
        result: Result<String, ApiError>,
    },
    Stream {
        request_id: RequestId,
        event: StreamEvent,
    },
    EnhancedQueryCompleted {
        request_id: RequestId,
        result: Result<StreamSummary, StreamFailure>,
    },
    HealthChecked {
        request_id: RequestId,
        result: Result<(), ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    LocalFile { path: String },
    InvalidBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::LocalFile { path } => write!(f, "cannot read {path}"),
            FailureKind::InvalidBody => write!(f, "invalid response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
