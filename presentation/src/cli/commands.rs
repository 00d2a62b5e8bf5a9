//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - chat with a deliberating council of models")]
#[command(long_about = r#"
llm-council is a terminal client for a council backend where every message
is answered by several models deliberating in three stages:

1. First opinions: each council model answers independently
2. Peer rankings: each model reviews and ranks the others' answers
3. Synthesis: a chairman model folds everything into the final reply

Without arguments the interactive chat starts. With a question argument the
question is sent to a fresh conversation and the reply is printed.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/llm-council/config.toml   Global config

Example:
  llm-council "What's the best way to handle errors in Rust?"
  llm-council --chat
  llm-council --server http://council.local:8001/api
"#)]
pub struct Cli {
    /// A question to send to a fresh conversation (omit for chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode (the default when no question is given)
    #[arg(short, long)]
    pub chat: bool,

    /// Base URL of the council backend (overrides configuration)
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
