use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "clarifi",
    version,
    about = "Analyze legal documents and ask follow-up questions about them"
)]
pub struct Args {
    /// RON configuration file. Defaults to ./clarifi.ron when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Analysis endpoint URL.
    #[arg(long, value_name = "URL")]
    pub analysis_url: Option<String>,

    /// Question endpoint URL.
    #[arg(long, value_name = "URL")]
    pub question_url: Option<String>,

    /// Sign in as this user on startup.
    #[arg(long)]
    pub user: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,

    /// Log debug detail.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
            LogTarget::Off => LogDestination::Off,
        }
    }
}
