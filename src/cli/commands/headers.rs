//! Headers command - Fuzz every header value

use std::path::Path;

use anyhow::Result;

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

    let variants = injector.fuzz_headers(&template, &payloads.spec())?;
    print_variants(&variants, format, show)
}
