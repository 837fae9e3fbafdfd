use std::path::{Path, PathBuf};

use crate::persist::{AtomicFileWriter, PersistError};
use crate::render::{escape_html, highlight_stylesheet};

/// Rendered fragments of one settled streaming query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HtmlReport {
    pub question: String,
    pub contexts_html: Vec<String>,
    pub answer_html: String,
}

/// Assemble a standalone HTML page. `generated_utc` is stamped into the header.
pub fn build_html_report(report: &HtmlReport, generated_utc: &str) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{}</title>\n", escape_html(&report.question)));
    page.push_str(&format!(
        "<meta name=\"generated\" content=\"{}\">\n",
        escape_html(generated_utc)
    ));
    page.push_str("<style>\n");
    page.push_str(&highlight_stylesheet());
    page.push_str("</style>\n</head>\n<body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", escape_html(&report.question)));

    if !report.contexts_html.is_empty() {
        page.push_str("<section class=\"contexts\">\n<h2>Contexts</h2>\n");
        for (index, context) in report.contexts_html.iter().enumerate() {
            page.push_str(&format!(
                "<article class=\"context\" id=\"context-{}\">\n{}</article>\n",
                index + 1,
                context
            ));
        }
        page.push_str("</section>\n");
    }

    page.push_str("<section class=\"answer\">\n<h2>Answer</h2>\n");
    page.push_str(&report.answer_html);
    page.push_str("</section>\n</body>\n</html>\n");
    page
}

/// Write the report to `path`, replacing any existing file.
pub fn export_html_report(
    path: &Path,
    report: &HtmlReport,
    generated_utc: &str,
) -> Result<PathBuf, PersistError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PersistError::InvalidPath(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    AtomicFileWriter::new(dir).write(filename, &build_html_report(report, generated_utc))
}
