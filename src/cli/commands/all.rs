//! All command - Inject into every discoverable field

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cli::{build_injector, print_variants, OutputFormat, PayloadArgs, RequestArgs};

pub fn run(
    request: &RequestArgs,
    payloads: &PayloadArgs,
    show: bool,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let template = request.load()?;
    let (_, injector) = build_injector(config)?;

    let points = injector.find_injection_points(&template);
    if points.is_empty() {
        info!("No injection points found in {}", request.file.display());
    }

    let variants = injector.inject_all(&template, &payloads.spec())?;
    print_variants(&variants, format, show)
}
