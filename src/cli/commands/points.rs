//! Points command - List the injection points of a request

use anyhow::Result;
use colored::Colorize;

use httpinject::injection::{find_injection_points, Locator};

use crate::cli::{OutputFormat, RequestArgs};

pub fn run(request: &RequestArgs, format: OutputFormat) -> Result<()> {
    let template = request.load()?;
    let points = find_injection_points(&template);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!("{}", "Injection Points".cyan().bold());
    println!("{}", "=".repeat(60));
    println!();

    for locator in Locator::all() {
        let names = locator.points(&template);
        if names.is_empty() {
            continue;
        }
        println!("{}", locator.as_str().yellow().bold());
        for name in names {
            println!("  {}", name.green());
        }
        println!();
    }

    println!("{}", format!("Total: {} points", points.len()).dimmed());
    Ok(())
}
