//! Recursa CLI - Command-line interface for Recursa
//!
//! Reads resolver records, builds one call graph per input file and checks
//! it for recursion.
//!
//! Exit codes: 0 when every check passes, 1 when a recursion check fails,
//! 2 on any other error.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use recursa_graph::Expectation;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "recursa")]
#[command(author = "Recursa Contributors")]
#[command(version)]
#[command(about = "Recursion checks over resolved call graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Build configuration (defaults to .recursa/config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Recursa in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Check record files for recursion
    Check {
        /// Record files, one analysis per file
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only consider what this method can reach, e.g. "app.Main.run(int)"
        #[arg(short, long)]
        start: Option<String>,

        /// What the check expects to find
        #[arg(short, long, value_enum, default_value = "none")]
        expect: ExpectArg,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List the methods that lie on a cycle
    Cycles {
        /// Record file
        file: PathBuf,

        /// Only consider what this method can reach
        #[arg(short, long)]
        start: Option<String>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Export the call graph
    Export {
        /// Record file
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "dot")]
        format: ExportFormat,

        /// Export only what this method can reach
        #[arg(short, long)]
        start: Option<String>,

        /// Mark cycle members and cycle edges in red (DOT only)
        #[arg(long)]
        highlight: bool,
    },

    /// Show graph statistics and skipped calls
    Status {
        /// Record file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExpectArg {
    /// Fail if any recursion is found
    #[value(name = "none")]
    NoRecursion,
    /// Fail if no recursion is found
    Recursion,
}

impl From<ExpectArg> for Expectation {
    fn from(arg: ExpectArg) -> Self {
        match arg {
            ExpectArg::NoRecursion => Expectation::NoRecursion,
            ExpectArg::Recursion => Expectation::Recursion,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Dot,
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init { path } => commands::init(&path).map(|()| true),
        Commands::Check {
            files,
            start,
            expect,
            json,
        } => commands::check(config, &files, start.as_deref(), expect.into(), json),
        Commands::Cycles { file, start, json } => {
            commands::cycles(config, &file, start.as_deref(), json).map(|()| true)
        }
        Commands::Export {
            file,
            output,
            format,
            start,
            highlight,
        } => commands::export(
            config,
            &file,
            output.as_deref(),
            format,
            start.as_deref(),
            highlight,
        )
        .map(|()| true),
        Commands::Status { file } => commands::status(config, &file).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}
