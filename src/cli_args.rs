use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "send-pr",
    version,
    about = "LLM-assisted pull request description generator"
)]
pub struct Cli {
    /// Branch the pull request merges into (e.g. main or develop)
    pub target: String,

    /// Branch with the changes; defaults to the current branch
    pub source: Option<String>,

    /// Config file (default is ~/.config/send-pr.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API key; overrides the config file and OPENAI_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    /// Completion endpoint; overrides the config file and OPENAI_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model name to use (e.g. gpt-4o-mini)
    #[arg(long)]
    pub model: Option<String>,

    /// Read the diff from a file ('-' for stdin) instead of running git
    #[arg(long, value_name = "PATH")]
    pub diff_file: Option<PathBuf>,

    /// Print the rendered prompt and exit without calling the model
    #[arg(long)]
    pub print_prompt: bool,

    /// Write the markdown here instead of a temporary pr_result_*.md file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
