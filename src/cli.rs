//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download chat room message logs as CSV files.
///
/// Sends the API token, room id, and message count to the export backend
/// and saves the CSV reply as `chatwork_logs_<room>_<timestamp>.csv`.
#[derive(Parser, Debug)]
#[command(name = "chatlog-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Chatwork API token
    #[arg(short = 't', long, env = "CHATWORK_API_TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Room id whose messages should be exported
    #[arg(short = 'r', long, default_value = "")]
    pub room: String,

    /// Number of messages to export (1-1000 advised; invalid input becomes 1)
    #[arg(short = 'n', long, default_value = "100", allow_hyphen_values = true)]
    pub count: String,

    /// Base URL of the export backend
    #[arg(long, env = "CHATLOG_BACKEND_URL")]
    pub backend_url: String,

    /// Connect timeout in seconds
    #[arg(long, env = "CHATLOG_CONNECT_TIMEOUT", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Overall request timeout in seconds (unset waits for the transport)
    #[arg(long, env = "CHATLOG_REQUEST_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub request_timeout: Option<u64>,

    /// Directory the CSV file is saved into
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Write the CSV to stdout instead of a file
    #[arg(long, conflicts_with = "output_dir")]
    pub stdout: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
