//! Inject command - Targeted injection into one field or offset

use std::path::Path;

use anyhow::Result;
use tracing::info;

use httpinject::injection::{InjectSpec, Offset};
use httpinject::payloads::PayloadEncoding;

use crate::cli::{build_injector, print_variants, OutputFormat, PayloadArgs, RequestArgs};

/// Options of one `inject` invocation
#[derive(Debug, Clone, Default)]
pub struct InjectOptions {
    pub to: Vec<String>,
    pub at: Vec<String>,
    pub offsets: Vec<Offset>,
    pub append: Option<bool>,
    pub choice: Option<usize>,
    pub encoding: Option<PayloadEncoding>,
    pub show: bool,
}

impl InjectOptions {
    /// Build the library call; CLI flags win over config defaults
    fn spec(&self, payloads: &PayloadArgs, default_append: bool) -> InjectSpec {
        let mut spec = InjectSpec::new()
            .to_each(self.to.iter().cloned())
            .at_each(self.at.iter().cloned())
            .at_each(self.offsets.iter().cloned())
            .with_payloads(payloads.spec())
            .with_append(self.append.unwrap_or(default_append));
        if let Some(choice) = self.choice {
            spec = spec.with_choice(choice);
        }
        if let Some(encoding) = self.encoding {
            spec = spec.with_encoding(encoding);
        }
        spec
    }
}

pub fn run(
    request: &RequestArgs,
    payloads: &PayloadArgs,
    options: &InjectOptions,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let template = request.load()?;
    let (config, injector) = build_injector(config)?;
    let spec = options.spec(payloads, config.inject.append);

    info!("Injecting {:?}", spec);
    let variants = injector.inject(&template, &spec)?;

    print_variants(&variants, format, options.show)
}
