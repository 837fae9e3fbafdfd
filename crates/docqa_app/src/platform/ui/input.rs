use std::path::PathBuf;

use docqa_core::Msg;

pub const HELP: &str = "\
:files <paths...>   select files for upload
:upload [paths...]  upload the given files, or the current selection
:query <text>       simple query, plain-text response
:ask <text>         streaming query (same as typing text without a command)
:export <path>      write the last streamed answer to an HTML file
:help               show this help
:quit               leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Dispatch(Vec<Msg>),
    Export(PathBuf),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_shell_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ask(line);
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    match name {
        "files" => ShellCommand::Dispatch(vec![Msg::FilesSelected(paths(rest))]),
        "upload" if rest.is_empty() => ShellCommand::Dispatch(vec![Msg::UploadClicked]),
        "upload" => ShellCommand::Dispatch(vec![
            Msg::FilesSelected(paths(rest)),
            Msg::UploadClicked,
        ]),
        "query" => ShellCommand::Dispatch(vec![
            Msg::QueryChanged(rest.to_string()),
            Msg::QuerySubmitted,
        ]),
        "ask" => ask(rest),
        "export" if !rest.is_empty() => ShellCommand::Export(PathBuf::from(rest)),
        "help" | "h" => ShellCommand::Help,
        "quit" | "q" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(name.to_string()),
    }
}

fn ask(text: &str) -> ShellCommand {
    ShellCommand::Dispatch(vec![
        Msg::EnhancedQueryChanged(text.to_string()),
        Msg::EnhancedQuerySubmitted,
    ])
}

fn paths(rest: &str) -> Vec<PathBuf> {
    rest.split_whitespace().map(PathBuf::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_text_is_a_streaming_query() {
        assert_eq!(
            parse_shell_line("  what changed?  "),
            ShellCommand::Dispatch(vec![
                Msg::EnhancedQueryChanged("what changed?".to_string()),
                Msg::EnhancedQuerySubmitted,
            ])
        );
    }

    #[test]
    fn upload_with_paths_selects_then_uploads() {
        assert_eq!(
            parse_shell_line(":upload a.md  docs/b.txt"),
            ShellCommand::Dispatch(vec![
                Msg::FilesSelected(vec![PathBuf::from("a.md"), PathBuf::from("docs/b.txt")]),
                Msg::UploadClicked,
            ])
        );
        assert_eq!(
            parse_shell_line(":upload"),
            ShellCommand::Dispatch(vec![Msg::UploadClicked])
        );
    }

    #[test]
    fn query_keeps_inner_spacing() {
        assert_eq!(
            parse_shell_line(":query a  b"),
            ShellCommand::Dispatch(vec![
                Msg::QueryChanged("a  b".to_string()),
                Msg::QuerySubmitted,
            ])
        );
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse_shell_line(""), ShellCommand::Empty);
        assert_eq!(parse_shell_line(":q"), ShellCommand::Quit);
        assert_eq!(parse_shell_line(":help"), ShellCommand::Help);
        assert_eq!(
            parse_shell_line(":export out/answer.html"),
            ShellCommand::Export(PathBuf::from("out/answer.html"))
        );
        assert_eq!(
            parse_shell_line(":export"),
            ShellCommand::Unknown("export".to_string())
        );
        assert_eq!(
            parse_shell_line(":bogus x"),
            ShellCommand::Unknown("bogus".to_string())
        );
    }
}
