use std::io::{self, Write};

use docqa_core::{AppViewModel, RenderedText};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Markdown,
    Html,
}

/// Prints view changes to a terminal stream.
///
/// The printer remembers the last view it drew and writes only the difference:
/// new contexts as they arrive, and the unseen tail of a growing answer.
pub struct TerminalPrinter<W: Write> {
    out: W,
    mode: OutputMode,
    previous: AppViewModel,
    printed_answer: String,
}

impl<W: Write> TerminalPrinter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            previous: AppViewModel::default(),
            printed_answer: String::new(),
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        self.render_upload(view)?;
        self.render_query(view)?;
        self.render_enhanced(view)?;
        self.out.flush()?;
        self.previous = view.clone();
        Ok(())
    }

    pub fn note(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_upload(&mut self, view: &AppViewModel) -> io::Result<()> {
        let (before, now) = (&self.previous.upload, &view.upload);
        if now.uploading && !before.uploading {
            writeln!(self.out, "Uploading {} file(s)...", now.selected_files.len())?;
        }
        if before.uploading && !now.uploading {
            match &now.error {
                Some(error) => writeln!(self.out, "{error}")?,
                None if now.succeeded => writeln!(self.out, "Upload complete.")?,
                None => {}
            }
        }
        Ok(())
    }

    fn render_query(&mut self, view: &AppViewModel) -> io::Result<()> {
        let (before, now) = (&self.previous.query, &view.query);
        let answered = now.last_completed.is_some() && now.last_completed != before.last_completed;
        if before.querying && !now.querying && answered {
            writeln!(self.out, "{}", now.response.trim_end())?;
        }
        Ok(())
    }

    fn render_enhanced(&mut self, view: &AppViewModel) -> io::Result<()> {
        let now = &view.enhanced;
        if now.streaming && !self.previous.enhanced.streaming {
            self.printed_answer.clear();
        }

        let already = if now.contexts.len() >= self.previous.enhanced.contexts.len() {
            self.previous.enhanced.contexts.len()
        } else {
            0
        };
        for (index, context) in now.contexts.iter().enumerate().skip(already) {
            let body = pick(self.mode, context).trim_end();
            writeln!(self.out, "[context {}]", index + 1)?;
            writeln!(self.out, "{body}")?;
        }

        let answer = pick(self.mode, &now.answer).to_owned();
        if answer != self.printed_answer {
            if self.printed_answer.is_empty() {
                writeln!(self.out, "[answer]")?;
                write!(self.out, "{answer}")?;
            } else if let Some(tail) = answer.strip_prefix(self.printed_answer.as_str()) {
                write!(self.out, "{tail}")?;
            } else {
                writeln!(self.out)?;
                writeln!(self.out, "[answer]")?;
                write!(self.out, "{answer}")?;
            }
            self.printed_answer = answer;
        }

        let settled = self.previous.enhanced.streaming && !now.streaming;
        if settled && !self.printed_answer.is_empty() && !self.printed_answer.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

fn pick(mode: OutputMode, text: &RenderedText) -> &str {
    match mode {
        OutputMode::Markdown => &text.markdown,
        OutputMode::Html => &text.html,
    }
}
