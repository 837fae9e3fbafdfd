use std::path::PathBuf;

use crate::view_model::AppViewModel;

pub type RequestId = u64;

/// Markdown source paired with the HTML rendered from it.
///
/// Contexts and answers are always stored as pairs so the rendered form can
/// never drift from its source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedText {
    pub markdown: String,
    pub html: String,
}

impl RenderedText {
    pub fn new(markdown: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            html: html.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.markdown.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    pub selected_files: Vec<PathBuf>,
    pub uploading: bool,
    pub succeeded: bool,
    pub error: Option<String>,
    pub(crate) in_flight: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleQueryState {
    pub query_text: String,
    pub response: String,
    pub querying: bool,
    /// Id of the most recent query that completed successfully.
    pub last_completed: Option<RequestId>,
    pub(crate) in_flight: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnhancedQueryState {
    pub query_text: String,
    pub answer: RenderedText,
    pub contexts: Vec<RenderedText>,
    pub streaming: bool,
    pub(crate) in_flight: Option<RequestId>,
}

impl EnhancedQueryState {
    pub fn raw_contexts(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.markdown.as_str()).collect()
    }

    pub fn rendered_contexts(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.html.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    upload: UploadState,
    query: SimpleQueryState,
    enhanced: EnhancedQueryState,
    last_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            upload: self.upload.clone(),
            query: self.query.clone(),
            enhanced: self.enhanced.clone(),
        }
    }

    /// True while any operation is waiting on the engine.
    pub fn is_busy(&self) -> bool {
        self.upload.in_flight.is_some()
            || self.query.in_flight.is_some()
            || self.enhanced.in_flight.is_some()
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn allocate_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    pub(crate) fn select_files(&mut self, files: Vec<PathBuf>) {
        self.upload.selected_files = files;
        self.mark_dirty();
    }

    pub(crate) fn start_upload(&mut self) -> (RequestId, Vec<PathBuf>) {
        let request_id = self.allocate_request_id();
        self.upload.uploading = true;
        self.upload.succeeded = false;
        self.upload.error = None;
        self.upload.in_flight = Some(request_id);
        self.mark_dirty();
        (request_id, self.upload.selected_files.clone())
    }

    pub(crate) fn finish_upload(&mut self, request_id: RequestId, result: Result<(), String>) {
        if self.upload.in_flight != Some(request_id) {
            return;
        }
        self.upload.in_flight = None;
        self.upload.uploading = false;
        match result {
            Ok(()) => {
                self.upload.succeeded = true;
                self.upload.error = None;
                self.upload.selected_files.clear();
            }
            Err(message) => {
                self.upload.succeeded = false;
                self.upload.error = Some(message);
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn set_query_text(&mut self, text: String) {
        self.query.query_text = text;
        self.mark_dirty();
    }

    pub(crate) fn query_text(&self) -> &str {
        &self.query.query_text
    }

    pub(crate) fn start_query(&mut self) -> RequestId {
        let request_id = self.allocate_request_id();
        self.query.querying = true;
        self.query.in_flight = Some(request_id);
        self.mark_dirty();
        request_id
    }

    pub(crate) fn finish_query(&mut self, request_id: RequestId, result: Result<String, String>) {
        if self.query.in_flight != Some(request_id) {
            return;
        }
        self.query.in_flight = None;
        self.query.querying = false;
        // A failed query keeps the previous response.
        if let Ok(response) = result {
            self.query.response = response;
            self.query.last_completed = Some(request_id);
        }
        self.mark_dirty();
    }

    pub(crate) fn set_enhanced_query_text(&mut self, text: String) {
        self.enhanced.query_text = text;
        self.mark_dirty();
    }

    pub(crate) fn enhanced_query_text(&self) -> &str {
        &self.enhanced.query_text
    }

    pub(crate) fn start_enhanced_query(&mut self) -> RequestId {
        let request_id = self.allocate_request_id();
        self.enhanced.contexts.clear();
        self.enhanced.answer = RenderedText::default();
        self.enhanced.streaming = true;
        self.enhanced.in_flight = Some(request_id);
        self.mark_dirty();
        request_id
    }

    pub(crate) fn push_context(&mut self, request_id: RequestId, context: RenderedText) {
        if self.enhanced.in_flight != Some(request_id) {
            return;
        }
        self.enhanced.contexts.push(context);
        self.mark_dirty();
    }

    pub(crate) fn replace_answer(&mut self, request_id: RequestId, answer: RenderedText) {
        if self.enhanced.in_flight != Some(request_id) {
            return;
        }
        self.enhanced.answer = answer;
        self.mark_dirty();
    }

    pub(crate) fn finish_enhanced_query(
        &mut self,
        request_id: RequestId,
        failure: Option<RenderedText>,
    ) {
        if self.enhanced.in_flight != Some(request_id) {
            return;
        }
        self.enhanced.in_flight = None;
        self.enhanced.streaming = false;
        if let Some(failure) = failure {
            self.enhanced.answer = failure;
        }
        self.mark_dirty();
    }
}
