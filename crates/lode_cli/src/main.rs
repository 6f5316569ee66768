//! Lode CLI: inspect and maintain a lode storage root from the command line.
//!
//! Provides `lode resolve` for search-path lookups, `lode inspect` for
//! examining the artifact slot of a source file, `lode clear` for emptying
//! the storage root, and `lode stats` for cache counters.

#![warn(missing_docs)]

mod clear;
mod inspect;
mod logging;
mod project;
mod resolve;
mod stats;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Lode: cached search-path resolution and compiled-artifact storage.
#[derive(Parser, Debug)]
#[command(name = "lode", version, about = "Lode cache tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `lode.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve logical names against the search path.
    Resolve(ResolveArgs),
    /// Show the artifact slot of a source file.
    Inspect(InspectArgs),
    /// Remove every stored artifact and index snapshot.
    Clear,
    /// Resolve a batch of names and print cache counters.
    Stats(StatsArgs),
}

/// Arguments for the `lode resolve` subcommand.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Logical names to resolve.
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Search directories, replacing the configured search path.
    #[arg(long = "path", num_args = 1..)]
    pub path: Vec<String>,

    /// Candidate extensions, replacing the configured list.
    #[arg(long = "ext", num_args = 1..)]
    pub ext: Vec<String>,
}

/// Arguments for the `lode inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Source file whose slot to inspect.
    pub file: String,

    /// Artifact kind.
    #[arg(short, long, value_enum, default_value_t = KindArg::Code)]
    pub kind: KindArg,

    /// Document format, for `--kind document`.
    #[arg(long, default_value = "yaml")]
    pub format: String,

    /// Compile flags the artifact was produced with.
    #[arg(long = "flag", num_args = 1..)]
    pub flags: Vec<String>,
}

/// Arguments for the `lode stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Logical names to resolve before reporting.
    pub names: Vec<String>,

    /// Save the directory index after resolving.
    #[arg(long)]
    pub save_index: bool,
}

/// Artifact kind selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Compiled code.
    Code,
    /// Parsed document.
    Document,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a config file or its directory.
    pub config: Option<String>,
    /// Whether to print JSON.
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
        json: cli.json,
    };

    let result = match cli.command {
        Command::Resolve(ref args) => resolve::run(args, &global),
        Command::Inspect(ref args) => inspect::run(args, &global),
        Command::Clear => clear::run(&global),
        Command::Stats(ref args) => stats::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
