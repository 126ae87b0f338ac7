//! Payloads command - List available payload sets

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use indexmap::IndexMap;

use httpinject::payloads::DEFAULT_SET;

use crate::cli::{load_config, OutputFormat};

pub fn run(name: Option<&str>, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let (_, store) = load_config(config)?;

    if let Some(name) = name {
        let payloads = store.resolve(&name.into())?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&payloads)?),
            OutputFormat::Text => {
                for payload in payloads {
                    println!("{}", payload);
                }
            }
        }
        return Ok(());
    }

    let sizes: IndexMap<String, usize> = store
        .names()
        .into_iter()
        .map(|name| {
            let len = store.get(&name).map(|set| set.len()).unwrap_or(0);
            (name, len)
        })
        .collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&sizes)?);
        return Ok(());
    }

    println!("{}", "Payload Sets".cyan().bold());
    println!("{}", "=".repeat(60));
    println!();

    for (name, len) in &sizes {
        let label = if name == DEFAULT_SET {
            name.green().bold()
        } else {
            name.green()
        };
        println!("  {:<20} {}", label, format!("{} payloads", len).dimmed());
    }

    println!();
    println!("{}", format!("Total: {} sets", sizes.len()).dimmed());
    Ok(())
}
