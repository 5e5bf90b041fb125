//! StarQuery CLI
//!
//! Command-line interface for structural queries over Starlark files.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use starquery_core::config::Config;
use starquery_index::Index;
use starquery_query::{Engine, Formatter, OutputFormat};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starquery")]
#[command(author, version, about = "Structural queries over Starlark build files", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a query, e.g. `defs(//lib/...)`
    Query {
        /// Query expression
        #[arg(value_name = "QUERY")]
        query: String,

        /// Output format (name, location, json, count)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        index: IndexArgs,
    },

    /// Report load cycles
    Cycles {
        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Args)]
struct IndexArgs {
    /// Workspace root (default: from config, else the current directory)
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Query even when every matched file failed to index
    #[arg(long)]
    keep_going: bool,

    /// Index files sequentially
    #[arg(long)]
    no_parallel: bool,
}

impl IndexArgs {
    /// Configuration file values overridden by flags
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(workspace) = &self.workspace {
            config.workspace = workspace.clone();
        }
        if self.keep_going {
            config.index.keep_going = true;
        }
        if self.no_parallel {
            config.index.parallel = false;
        }
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Query {
            query,
            output,
            index,
        } => {
            let config = index.config()?;
            cmd_query(&config, &query, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Cycles { index } => {
            let config = index.config()?;
            cmd_cycles(&config)
        }
    }
}

/// Index the configured initial pattern
fn build_index(config: &Config) -> Result<Index> {
    if !config.workspace.is_dir() {
        bail!("workspace {} is not a directory", config.workspace.display());
    }

    let index = Index::with_config(&config.workspace, config.index.clone());
    let (count, errors) = index.add_pattern(&config.index.initial_pattern);
    info!(
        "Indexed {} files from {} under {}",
        count,
        config.index.initial_pattern,
        config.workspace.display()
    );

    if let Some(first) = errors.first() {
        if count == 0 && !config.index.keep_going {
            bail!(
                "no files indexed, {} failed, first: {} (use --keep-going to query anyway)",
                errors.len(),
                first
            );
        }
    }
    Ok(index)
}

fn cmd_query(config: &Config, query: &str, output: Option<&str>) -> Result<()> {
    let format: OutputFormat = output
        .unwrap_or(config.output.format.as_str())
        .parse()
        .map_err(|e: String| anyhow!(e))?;

    let index = build_index(config)?;
    let result = Engine::new(&index).eval_str(query)?;
    debug!("Query {} returned {} items", query, result.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Formatter::new(format).write(&mut out, query, &result)?;
    out.flush()?;
    Ok(())
}

fn cmd_cycles(config: &Config) -> Result<ExitCode> {
    let index = build_index(config)?;
    let cycles = index.build_load_graph().detect_cycles();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for cycle in &cycles {
        writeln!(out, "{}", cycle.join(" -> "))?;
    }
    out.flush()?;

    if cycles.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("found {} load cycle(s)", cycles.len());
        Ok(ExitCode::FAILURE)
    }
}
