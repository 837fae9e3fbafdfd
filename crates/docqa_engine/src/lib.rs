//! Docqa engine: HTTP client, stream decoding, markdown rendering and effect execution.
mod api;
mod decode;
mod engine;
mod export;
mod persist;
mod render;
mod stream;
mod types;
mod upload;

pub use api::{ApiSettings, ChannelStreamSink, QaApi, ReqwestApi, StreamSink};
pub use decode::{decode_line, encoding_for_content_type};
pub use engine::{EngineHandle, EngineStartError};
pub use export::{build_html_report, export_html_report, HtmlReport};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use render::{highlight_stylesheet, render_markdown, HighlightingRenderer, MarkdownRenderer};
pub use stream::{parse_event_line, EventKind, LineBuffer, LineOutcome, StreamRecord};
pub use types::{
    ApiError, EngineEvent, FailureKind, RenderedMarkdown, RequestId, StreamEvent, StreamFailure,
    StreamSummary, UploadReceipt,
};
