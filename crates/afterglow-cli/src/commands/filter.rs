//! Single-filter commands

#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::{Result, Context, bail};
use afterglow_ops::{Filter, FilterKind};

use crate::FilterArgs;
use crate::commands::Session;

pub fn run(kind: FilterKind, args: FilterArgs, session: &Session) -> Result<()> {
    let filter = build(kind, &args.params)?;
    debug!(?filter, "filter command");
    session.process(&args.input, &args.output, &[filter])
}

/// Resolves `-p key=value` overrides against `kind`'s schema.
fn build(kind: FilterKind, params: &[String]) -> Result<Filter> {
    let pairs = params
        .iter()
        .map(|p| parse_param(p))
        .collect::<Result<Vec<_>>>()?;
    Filter::from_pairs(kind, pairs).with_context(|| format!("Invalid parameters for {kind}"))
}

fn parse_param(text: &str) -> Result<(&str, &str)> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("Invalid parameter '{}': expected KEY=VALUE", text),
    }
}
