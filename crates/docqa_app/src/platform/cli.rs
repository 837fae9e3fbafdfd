use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "docqa", version, about = "Upload documents to a docqa service and ask it questions")]
pub struct Cli {
    /// RON config file. Defaults to ./docqa.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Service base URL, overriding the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print rendered HTML instead of markdown.
    #[arg(long, global = true)]
    pub html: bool,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log_to: LogTarget,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload files as context documents.
    Upload { files: Vec<PathBuf> },
    /// Ask a question and print the plain-text response.
    Query {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Ask a question and stream retrieved contexts and the answer.
    Ask {
        /// Write the contexts and answer to an HTML file afterwards.
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Check that the service is reachable.
    Health,
    /// Interactive session; type `:help` for commands.
    Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match self.log_to {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_joins_words_and_reads_global_flags() {
        let cli = Cli::try_parse_from([
            "docqa", "-vv", "ask", "--export", "out.html", "what", "is", "rust?",
        ])
        .unwrap();

        assert_eq!(cli.log_level(), LevelFilter::Debug);
        match cli.command {
            Command::Ask { export, text } => {
                assert_eq!(export, Some(PathBuf::from("out.html")));
                assert_eq!(text.join(" "), "what is rust?");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn upload_accepts_empty_selection() {
        let cli = Cli::try_parse_from(["docqa", "upload"]).unwrap();
        assert!(matches!(cli.command, Command::Upload { files } if files.is_empty()));
    }

    #[test]
    fn quiet_limits_to_errors() {
        let cli = Cli::try_parse_from(["docqa", "--quiet", "--log-to", "both", "health"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Error);
        assert!(matches!(cli.log_destination(), LogDestination::Both));
    }
}
