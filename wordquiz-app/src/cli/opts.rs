use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "wordquiz", version, about = "WordQuiz CLI")]
pub struct Cli {
    /// Data directory (defaults to the platform app data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a quiz session over a CSV wordbook
    Quiz(QuizCmd),
    /// List a wordbook's words with priority, category, and counters
    Words(WordsCmd),
    /// Lifetime stats and session history
    Stats(StatsCmd),
    /// List known wordbooks
    Books,
    /// Show or change session defaults
    Settings(SettingsCmd),
    /// Delete a wordbook's progress
    Reset(ResetCmd),
}

#[derive(Debug, Args, Clone)]
pub struct QuizCmd {
    /// CSV wordbook: question,answer[,reading] per line
    pub file: PathBuf,
    /// New words this session (overrides settings and the book's own value)
    #[arg(long)]
    pub new: Option<usize>,
    /// Review words this session (overrides settings and the book's own value)
    #[arg(long)]
    pub review: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct WordsCmd {
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct StatsCmd {
    /// Restrict to one wordbook
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// How many recent sessions to show
    #[arg(long, default_value_t = 10)]
    pub sessions: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SettingsCmd {
    #[arg(long)]
    pub new: Option<usize>,
    #[arg(long)]
    pub review: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct ResetCmd {
    pub file: PathBuf,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}
