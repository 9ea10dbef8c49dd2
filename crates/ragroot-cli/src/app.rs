//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragroot")]
#[command(
    author,
    version,
    about = "Grounded question answering over your knowledge base"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output (prints the workflow trace)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question with grading and corrective web fallback
    Ask(AskArgs),

    /// Answer a question with the plan/execute/critique loop
    Agent(AskArgs),

    /// Split a file into retrieval-ready chunks
    Chunk(ChunkArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// The question
    pub query: Vec<String>,

    /// Number of evidence items to retain (overrides the config file)
    #[arg(short = 'n', long)]
    pub top_k: Option<usize>,

    /// Rerank fused candidates with the LLM
    #[arg(long)]
    pub rerank: bool,

    /// Retrieval mode (overrides the config file)
    #[arg(long, value_enum)]
    pub search_type: Option<SearchTypeArg>,

    /// Minimum score for retained evidence (overrides the config file)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Metadata equality filters, key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchTypeArg {
    Vector,
    Keyword,
    Hybrid,
    Graph,
}

#[derive(Args)]
pub struct ChunkArgs {
    /// File to split
    pub file: PathBuf,

    /// Chunking preset
    #[arg(long, value_enum, default_value = "general")]
    pub preset: PresetArg,

    /// Override chunk size in characters
    #[arg(long)]
    pub size: Option<usize>,

    /// Override chunk overlap in characters
    #[arg(long)]
    pub overlap: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    General,
    Legal,
    Code,
    Granular,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
