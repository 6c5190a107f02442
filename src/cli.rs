mod value_arg;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
pub use value_arg::{BoostArg, FieldArg, parse_value};

use crate::query::DefaultOperator;

/// Build search-backend query strings from words and field filters
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Also write the output to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Connections config file (TOML)
    #[arg(long, env = "SEARCH_QUERY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Index the query is meant for; must exist in the config
    #[arg(short, long, global = true)]
    pub index: Option<String>,

    /// When to colorize diagnostics
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print the result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Turn free-text user input into a query, one clause per word
    Parse {
        /// Words to search for; empty input matches everything
        words: Vec<String>,

        /// Operator joining the words
        #[arg(long, value_enum, default_value_t = OperatorArg::And)]
        op: OperatorArg,
    },
    /// Build a single clause from free text or one field filter
    Term {
        /// Free text to match
        text: Option<String>,

        /// Field filter as name=value or name__lookup=value
        #[arg(short = 'f', long = "field")]
        fields: Vec<FieldArg>,

        /// Boost as field^factor
        #[arg(long)]
        boost: Option<BoostArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperatorArg {
    And,
    Or,
}

impl From<OperatorArg> for DefaultOperator {
    fn from(op: OperatorArg) -> Self {
        match op {
            OperatorArg::And => DefaultOperator::And,
            OperatorArg::Or => DefaultOperator::Or,
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
