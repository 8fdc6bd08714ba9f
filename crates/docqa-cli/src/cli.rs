//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// DocQA - ask questions about your documents
#[derive(Debug, Parser)]
#[command(name = "docqa", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to ~/.docqa/config.toml)
    #[arg(long, global = true, env = "DOCQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use for this invocation
    #[arg(short, long, global = true, env = "DOCQA_PROFILE")]
    pub profile: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliFormat {
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Quiet format (identifiers and bare answers only)
    Quiet,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract, chunk and store a .txt, .pdf or .docx file
    Ingest(IngestArgs),

    /// List stored documents
    Documents,

    /// Show one document with a content preview
    Show(DocumentArg),

    /// Ask a question about a document
    Ask(AskArgs),

    /// Summarize a document
    Summarize(DocumentArg),

    /// List asked questions
    History(HistoryArgs),

    /// Delete a history entry
    Forget(ForgetArgs),

    /// Delete a document and its history
    Remove(RemoveArgs),

    /// Print a document's chunk offsets
    Chunks(DocumentArg),

    /// Database viewer: row counts and table listings
    Tables(TablesArgs),

    /// Ask repeated questions about one document
    Chat(DocumentArg),

    /// Manage profiles
    Profile(ProfileArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// File to ingest
    pub file: PathBuf,
}

/// A single document identifier.
#[derive(Debug, Args)]
pub struct DocumentArg {
    /// Document ID
    pub id: String,
}

/// Arguments for the ask command.
#[derive(Debug, Args)]
pub struct AskArgs {
    /// Document ID
    pub id: String,

    /// Question (remaining words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

/// Arguments for the history command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Only show questions asked about this document
    #[arg(short, long)]
    pub document: Option<String>,

    /// Maximum entries to show
    #[arg(short, long, default_value_t = docqa_domain::traits::DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,
}

/// Arguments for the forget command.
#[derive(Debug, Args)]
pub struct ForgetArgs {
    /// History entry IDs
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

/// Arguments for the remove command.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Document ID
    pub id: String,

    /// Also delete the stored source file
    #[arg(long)]
    pub delete_file: bool,
}

/// Arguments for the tables command.
#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Maximum history rows to list
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for profile management.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Profile action
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show the active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },
}
