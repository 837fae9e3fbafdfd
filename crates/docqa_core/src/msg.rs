use std::path::PathBuf;

use crate::{RenderedText, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User replaced the file selection.
    FilesSelected(Vec<PathBuf>),
    /// User asked to upload the current selection.
    UploadClicked,
    /// Engine finished an upload. `Err` holds a user-facing message.
    UploadFinished {
        request_id: RequestId,
        result: Result<(), String>,
    },
    /// User edited the simple query box.
    QueryChanged(String),
    /// User submitted the simple query.
    QuerySubmitted,
    /// Engine finished a simple query.
    QueryFinished {
        request_id: RequestId,
        result: Result<String, String>,
    },
    /// User edited the enhanced query box.
    EnhancedQueryChanged(String),
    /// User submitted the enhanced (streaming) query.
    EnhancedQuerySubmitted,
    /// A `context` event arrived on the stream.
    ContextReceived {
        request_id: RequestId,
        context: RenderedText,
    },
    /// An `answer` event arrived; it carries the full answer so far.
    AnswerReceived {
        request_id: RequestId,
        answer: RenderedText,
    },
    /// The stream ended. `failure` is the rendered error text when it failed.
    EnhancedQueryFinished {
        request_id: RequestId,
        failure: Option<RenderedText>,
    },
}
