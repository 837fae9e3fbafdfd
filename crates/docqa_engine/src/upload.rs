use std::io;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::{ApiError, FailureKind};

/// One streamed part per file under `field`, in selection order.
pub(crate) async fn build_upload_form(field: &str, files: &[PathBuf]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for path in files {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|err| file_error(path, err))?;
        let len = file
            .metadata()
            .await
            .map_err(|err| file_error(path, err))?
            .len();
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, len)
            .file_name(display_name(path))
            .mime_str(mime.essence_str())
            .map_err(|err| ApiError::new(FailureKind::InvalidBody, err.to_string()))?;
        form = form.part(field.to_owned(), part);
    }
    Ok(form)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_error(path: &Path, err: io::Error) -> ApiError {
    ApiError::new(
        FailureKind::LocalFile {
            path: path.display().to_string(),
        },
        err.to_string(),
    )
}
