use std::io::{self, BufRead, Stdout, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use docqa_core::{update, AppState, AppViewModel, Msg};
use docqa_engine::{export_html_report, EngineEvent, EngineHandle, HtmlReport};
use engine_logging::{engine_info, engine_warn};

use super::cli::{Cli, Command};
use super::config::load_config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::input::{parse_shell_line, ShellCommand, HELP};
use super::ui::render::{OutputMode, TerminalPrinter};

const HEALTH_POLL: Duration = Duration::from_millis(20);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(cli.log_destination(), cli.log_level());

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    engine_info!("Using service at {}", config.base_url);
    let engine = EngineHandle::new(config.into_settings()).context("starting engine")?;
    let mode = if cli.html {
        OutputMode::Html
    } else {
        OutputMode::Markdown
    };

    match cli.command {
        Command::Health => Ok(check_health(&engine)),
        Command::Upload { files } => run_once(
            Session::start(engine, mode),
            vec![Msg::FilesSelected(files), Msg::UploadClicked],
            None,
        ),
        Command::Query { text } => run_once(
            Session::start(engine, mode),
            vec![Msg::QueryChanged(text.join(" ")), Msg::QuerySubmitted],
            None,
        ),
        Command::Ask { export, text } => run_once(
            Session::start(engine, mode),
            vec![
                Msg::EnhancedQueryChanged(text.join(" ")),
                Msg::EnhancedQuerySubmitted,
            ],
            export.as_deref(),
        ),
        Command::Shell => {
            let mut session = Session::start(engine, mode);
            run_shell(&mut session)?;
            Ok(session.exit_code())
        }
    }
}

fn run_once(mut session: Session, msgs: Vec<Msg>, export: Option<&Path>) -> anyhow::Result<ExitCode> {
    session.dispatch_all(msgs)?;
    session.run_until_settled()?;
    if let Some(path) = export {
        session.export(path)?;
    }
    Ok(session.exit_code())
}

/// Owns the controller state and applies messages one at a time.
struct Session {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    printer: TerminalPrinter<Stdout>,
}

impl Session {
    fn start(engine: EngineHandle, mode: OutputMode) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            state: AppState::new(),
            runner: EffectRunner::new(engine, msg_tx),
            msg_rx,
            printer: TerminalPrinter::new(io::stdout(), mode),
        }
    }

    fn dispatch_all(&mut self, msgs: Vec<Msg>) -> io::Result<()> {
        for msg in msgs {
            self.dispatch(msg)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;

        if changed {
            self.printer.render(&self.state.view())?;
        }
        self.runner.enqueue(effects);
        Ok(())
    }

    /// Block on engine results until no operation is in flight.
    fn run_until_settled(&mut self) -> io::Result<()> {
        while self.state.is_busy() {
            match self.msg_rx.recv() {
                Ok(msg) => self.dispatch(msg)?,
                Err(_) => {
                    engine_warn!("Engine event loop stopped with work in flight");
                    break;
                }
            }
        }
        Ok(())
    }

    fn view(&self) -> AppViewModel {
        self.state.view()
    }

    fn export(&mut self, path: &Path) -> anyhow::Result<()> {
        let enhanced = self.view().enhanced;
        if enhanced.answer.is_empty() && enhanced.contexts.is_empty() {
            self.printer.note("Nothing to export yet.")?;
            return Ok(());
        }
        let report = HtmlReport {
            question: enhanced.query_text.clone(),
            contexts_html: enhanced
                .rendered_contexts()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            answer_html: enhanced.answer.html.clone(),
        };
        let written = export_html_report(path, &report, &Utc::now().to_rfc3339())
            .with_context(|| format!("exporting to {}", path.display()))?;
        engine_info!("Exported answer to {:?}", written);
        self.printer.note(&format!("Exported to {}", written.display()))?;
        Ok(())
    }

    fn exit_code(&self) -> ExitCode {
        if self.view().upload.error.is_some() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn run_shell(session: &mut Session) -> anyhow::Result<()> {
    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        match parse_shell_line(&line) {
            ShellCommand::Dispatch(msgs) => {
                session.dispatch_all(msgs)?;
                session.run_until_settled()?;
            }
            ShellCommand::Export(path) => {
                if let Err(err) = session.export(&path) {
                    session.printer.note(&format!("{err:#}"))?;
                }
            }
            ShellCommand::Help => session.printer.note(HELP)?,
            ShellCommand::Quit => break,
            ShellCommand::Empty => {}
            ShellCommand::Unknown(name) => session
                .printer
                .note(&format!("Unknown command :{name}; try :help"))?,
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    let mut stderr = io::stderr();
    write!(stderr, "docqa> ")?;
    stderr.flush()
}

fn check_health(engine: &EngineHandle) -> ExitCode {
    engine.health(0);
    loop {
        match engine.try_recv() {
            Some(EngineEvent::HealthChecked { result, .. }) => {
                return match result {
                    Ok(()) => {
                        println!("Service is healthy.");
                        ExitCode::SUCCESS
                    }
                    Err(err) => {
                        println!("Service is unreachable: {err}");
                        ExitCode::FAILURE
                    }
                };
            }
            Some(other) => engine_warn!("Ignoring unexpected engine event {:?}", other),
            None => thread::sleep(HEALTH_POLL),
        }
    }
}
