//! CLI argument definitions for the word column mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "wcm",
    version,
    about = "Word column mapper - resolve words to columns and rank their tables",
    long_about = "Resolve free-text words to column identifiers with typo tolerance.\n\n\
                  Mappings are loaded from JSON or a CSV export, combined with union or\n\
                  intersection, ranked per table and expanded over foreign-key relationships."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// TOML configuration file ([search], [cache], [traversal]).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Minimum confidence for fuzzy matches (overrides the config file).
    #[arg(long = "min-confidence", value_name = "SCORE", global = true)]
    pub min_confidence: Option<f64>,

    /// Print results as JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where the index data comes from.
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Word mappings as JSON: {"word": ["column", ...]}.
    #[arg(long = "mappings", value_name = "PATH", global = true)]
    pub mappings: Option<PathBuf>,

    /// Column to table index as JSON: {"column": "table"}.
    #[arg(long = "tables", value_name = "PATH", global = true)]
    pub tables: Option<PathBuf>,

    /// CSV export with field_name, column_name and table_name columns.
    #[arg(long = "csv", value_name = "PATH", global = true, conflicts_with = "mappings")]
    pub csv: Option<PathBuf>,

    /// Table relationships JSON (references / referenced_by per table).
    #[arg(long = "relationships", value_name = "PATH", global = true)]
    pub relationships: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Look up one word, correcting typos.
    Search(SearchArgs),

    /// List the words mapped to a column.
    Reverse(ReverseArgs),

    /// Columns shared by every word.
    Intersect(WordsArgs),

    /// Columns of any word.
    Union(WordsArgs),

    /// Rank the tables owning the union of the words' columns.
    Rank(RankArgs),

    /// Rank tables, then expand the top ones over relationships.
    Traverse(TraverseArgs),

    /// Show index statistics.
    Stats,
}

#[derive(Parser)]
pub struct SearchArgs {
    #[arg(value_name = "WORD")]
    pub word: String,

    /// Include further near matches and close words.
    #[arg(long = "suggestions")]
    pub suggestions: bool,
}

#[derive(Parser)]
pub struct ReverseArgs {
    #[arg(value_name = "COLUMN")]
    pub column: String,
}

#[derive(Parser)]
pub struct WordsArgs {
    #[arg(value_name = "WORD", required = true, num_args = 1..)]
    pub words: Vec<String>,
}

#[derive(Parser)]
pub struct RankArgs {
    #[arg(value_name = "WORD", required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Show only the first N tables.
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,
}

#[derive(Parser)]
pub struct TraverseArgs {
    #[arg(value_name = "WORD", required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Maximum number of relationship hops (overrides the config file).
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
