//! httpinject - Payload injection for raw HTTP requests
//!
//! Reads a raw HTTP request and prints the variants produced by injecting
//! payloads into its parameters, cookies, JSON fields, headers or raw
//! text offsets.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::commands;
use cli::commands::inject::InjectOptions;
use cli::{OutputFormat, PayloadArgs, RequestArgs};
use httpinject::errors::format_error;
use httpinject::injection::Offset;
use httpinject::payloads::PayloadEncoding;

/// httpinject - Generate injected variants of HTTP requests
#[derive(Parser)]
#[command(
    name = "httpinject",
    version,
    about = "Payload injection for raw HTTP requests",
    long_about = "httpinject turns one raw HTTP request into many variants, each carrying \
                  one payload at one injection point.\n\n\
                  Injection points:\n\
                  • Query string, url-encoded body, cookie and JSON fields by name\n\
                  • Raw request text by byte offset or literal pattern\n\
                  • Header values"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file (default: .httpinject.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inject payloads into named fields or raw offsets
    Inject {
        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        payloads: PayloadArgs,

        /// Field name to inject into (repeatable)
        #[arg(short, long, required_unless_present_any = ["at", "offset"])]
        to: Vec<String>,

        /// Literal pattern of the raw request to replace (repeatable)
        #[arg(short, long, conflicts_with = "to")]
        at: Vec<String>,

        /// Byte offset POS or range BEGIN:END of the raw request (repeatable)
        #[arg(long, conflicts_with = "to")]
        offset: Vec<Offset>,

        /// Append payloads to the original value
        #[arg(long)]
        append: bool,

        /// Replace the original value (overrides config)
        #[arg(long, conflicts_with = "append")]
        replace: bool,

        /// Occurrence (1-based) of a repeated --at pattern
        #[arg(long)]
        choice: Option<usize>,

        /// Payload encoding (overrides config)
        #[arg(short, long)]
        encoding: Option<PayloadEncoding>,

        /// Print each generated request in full
        #[arg(short, long)]
        show: bool,
    },

    /// List the injection points of a request
    Points {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Inject into every injection point of a request
    All {
        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        payloads: PayloadArgs,

        /// Print each generated request in full
        #[arg(short, long)]
        show: bool,
    },

    /// Replace each header value with every payload
    Headers {
        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        payloads: PayloadArgs,

        /// Print each generated request in full
        #[arg(short, long)]
        show: bool,
    },

    /// List payload sets, or the payloads of one set
    Payloads {
        /// Set to print
        name: Option<String>,
    },
}

fn init_logging(verbosity: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbosity {
            0 => EnvFilter::new("httpinject=info"),
            1 => EnvFilter::new("httpinject=debug"),
            2 => EnvFilter::new("httpinject=trace"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Inject {
            request,
            payloads,
            to,
            at,
            offset,
            append,
            replace,
            choice,
            encoding,
            show,
        } => {
            let options = InjectOptions {
                to,
                at,
                offsets: offset,
                append: match (append, replace) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                choice,
                encoding,
                show,
            };
            commands::inject::run(&request, &payloads, &options, config, cli.format)
        }
        Commands::Points { request } => commands::points::run(&request, cli.format),
        Commands::All {
            request,
            payloads,
            show,
        } => commands::all::run(&request, &payloads, show, config, cli.format),
        Commands::Headers {
            request,
            payloads,
            show,
        } => commands::headers::run(&request, &payloads, show, config, cli.format),
        Commands::Payloads { name } => {
            commands::payloads::run(name.as_deref(), config, cli.format)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "✖".red(), format_error(&err));
        std::process::exit(1);
    }
}
