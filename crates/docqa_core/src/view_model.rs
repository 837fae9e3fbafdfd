use crate::{EnhancedQueryState, SimpleQueryState, UploadState};

/// Snapshot of everything a front end needs to draw.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub upload: UploadState,
    pub query: SimpleQueryState,
    pub enhanced: EnhancedQueryState,
}

impl AppViewModel {
    pub fn is_settled(&self) -> bool {
        !self.upload.uploading && !self.query.querying && !self.enhanced.streaming
    }
}
