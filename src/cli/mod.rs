//! CLI module - Shared plumbing for command implementations

pub mod commands;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use httpinject::config::Config;
use httpinject::http::{Request, RequestSet};
use httpinject::payloads::{PayloadSpec, PayloadStore};
use httpinject::Injector;

/// Output format for CLI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the template request comes from and where it is sent
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Raw HTTP request file ("-" reads stdin)
    pub file: PathBuf,

    /// Target host (default: taken from the Host header)
    #[arg(long)]
    pub host: Option<String>,

    /// Target port (default: from the Host header, or 80/443)
    #[arg(long)]
    pub port: Option<u16>,

    /// Request is sent over TLS
    #[arg(long)]
    pub tls: bool,
}

impl RequestArgs {
    /// Read and parse the template request
    pub fn load(&self) -> Result<Request> {
        let raw = if self.file == Path::new("-") {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read request from stdin")?;
            raw
        } else {
            std::fs::read_to_string(&self.file)
                .with_context(|| format!("Failed to read request: {}", self.file.display()))?
        };

        let request = Request::parse(
            &raw,
            self.host.as_deref().unwrap_or(""),
            self.port.unwrap_or(0),
            self.tls,
        )?;
        tracing::debug!(
            "Loaded {} {} for {}:{}",
            request.method,
            request.url,
            request.hostname,
            request.port
        );
        Ok(request)
    }
}

/// Payload selection shared by the injecting commands
#[derive(Args, Debug, Clone, Default)]
pub struct PayloadArgs {
    /// Named payload set
    #[arg(short = 'P', long = "payloads", conflicts_with = "payload")]
    pub set: Option<String>,

    /// Explicit payload (repeatable)
    #[arg(short = 'p', long = "payload")]
    pub payload: Vec<String>,
}

impl PayloadArgs {
    pub fn spec(&self) -> PayloadSpec {
        match &self.set {
            Some(name) => PayloadSpec::named(name.clone()),
            None if !self.payload.is_empty() => PayloadSpec::Explicit(self.payload.clone()),
            None => PayloadSpec::default(),
        }
    }
}

/// Load configuration and build the payload store it describes
pub fn load_config(path: Option<&Path>) -> Result<(Config, PayloadStore)> {
    let config = match path {
        Some(p) => Config::load_from_file(Some(p))
            .with_context(|| format!("Failed to load config: {}", p.display()))?,
        None => Config::load_or_default(None),
    };
    let store = PayloadStore::from_config(&config).context("Failed to load payload sets")?;
    Ok((config, store))
}

/// Injector configured from the config file defaults
pub fn build_injector(config_path: Option<&Path>) -> Result<(Config, Injector)> {
    let (config, store) = load_config(config_path)?;
    let injector = Injector::new(store).with_encoding(config.inject.encoding);
    Ok((config, injector))
}

/// Print generated variants
///
/// Text output lists one line per variant; with `show` the full raw
/// request follows each line.
pub fn print_variants(variants: &RequestSet, format: OutputFormat, show: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(variants)?);
        }
        OutputFormat::Text => {
            println!(
                "{}",
                format!("Generated {} requests", variants.len()).cyan().bold()
            );
            println!("{}", "=".repeat(60));

            for (i, variant) in variants.iter().enumerate() {
                println!(
                    "{:>4}  {} {}  {} {}",
                    i + 1,
                    variant.method.green(),
                    variant.url,
                    variant.injection_point().unwrap_or("-").yellow(),
                    format!("{:?}", variant.payload().unwrap_or("")).dimmed()
                );
                if show {
                    println!();
                    println!("{}", variant.to_raw());
                    println!("{}", "-".repeat(60).dimmed());
                }
            }
        }
    }
    Ok(())
}
