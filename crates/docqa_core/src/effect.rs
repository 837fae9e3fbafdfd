use std::path::PathBuf;

use crate::RequestId;

/// IO the controller asks the engine to perform. Every effect carries the id
/// its completion message must echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    UploadFiles {
        request_id: RequestId,
        files: Vec<PathBuf>,
    },
    SubmitQuery {
        request_id: RequestId,
        content: String,
    },
    StreamEnhancedQuery {
        request_id: RequestId,
        content: String,
    },
}

impl Effect {
    pub fn request_id(&self) -> RequestId {
        match self {
            Effect::UploadFiles { request_id, .. }
            | Effect::SubmitQuery { request_id, .. }
            | Effect::StreamEnhancedQuery { request_id, .. } => *request_id,
        }
    }
}
