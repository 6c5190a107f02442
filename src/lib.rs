pub mod cli;
pub mod config;
pub mod query;
pub mod queryset;
pub mod wrappers;

use anyhow::Context;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{ConfigError, Connection, SearchConfig, load_config};
pub use query::{DefaultOperator, FieldQuery, Lookup, ParsingError, Query, Value};
pub use queryset::{Hit, QuerySet, QuerySetError, SearchOptions, SearchResults, SearchTransport};
pub use wrappers::{TypeWrapper, Wrapper};

/// Route diagnostics to stderr; `RUST_LOG` overrides the verbosity flags
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_query(command: &Commands) -> Result<Query, ParsingError> {
    match command {
        Commands::Parse { words, op } => Ok(Query::from_user_input(&words.join(" "), (*op).into())),
        Commands::Term {
            text,
            fields,
            boost,
        } => {
            let text = text.as_deref().map(cli::parse_value);
            let fields = fields
                .iter()
                .map(|field| (field.keyword.clone(), field.value()))
                .collect();
            let query = Query::from_args(text, fields)?;
            Ok(match boost {
                Some(boost) => query.with_boost(boost.field.clone(), boost.factor),
                None => query,
            })
        }
    }
}

fn write_output_file(path: &std::path::Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let search_config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(config_path) = &cli.config {
        info!(path = %config_path.display(), "loaded config");
    }
    debug!(indexes = ?search_config.indexes(), "available indexes");

    let connection = cli
        .index
        .as_deref()
        .map(|index| search_config.resolve(index))
        .transpose()?;

    if cli.verbose > 0 && !cli.quiet {
        eprintln!("Verbosity level: {}", cli.verbose);
        eprintln!("Color mode: {:?}", cli.color);
        if let Some(out_path) = &cli.output {
            eprintln!("Output will be written to: {}", out_path.display());
        }
        if let Some(config_path) = &cli.config {
            eprintln!("Config file: {}", config_path.display());
        }
        if let (Some(index), Some(connection)) = (&cli.index, connection) {
            eprintln!("Index: {index} ({})", connection.url);
        }
    }

    let query = build_query(&cli.command).context("Invalid query")?;
    let rendered = query.render();
    info!(query = %rendered, "rendered query");

    let output_text = match cli.format {
        OutputFormat::Text => format!("{rendered}\n"),
        OutputFormat::Json => {
            let body = serde_json::to_string_pretty(&json!({
                "query": rendered,
                "index": cli.index,
                "url": connection.map(|connection| connection.url.as_str()),
            }))
            .context("Failed to serialize output")?;
            format!("{body}\n")
        }
    };

    print!("{output_text}");
    if let Some(path) = &cli.output {
        write_output_file(path, &output_text)?;
    }

    Ok(())
}
