//! The `tagsmith rethreshold` command: re-filter a saved ranking without inference.

use std::path::{Path, PathBuf};

use clap::Args;
use tagsmith_core::{RankedTags, TagReport, Threshold};

/// Arguments for the `rethreshold` command.
#[derive(Args, Debug)]
pub struct RethresholdArgs {
    /// Ranking saved with `tagsmith tag --save-ranked`
    #[arg(required = true)]
    pub ranked: PathBuf,

    /// Keep tags scoring strictly above this probability (0.0 - 1.0)
    #[arg(short, long, required = true)]
    pub threshold: f32,

    /// Print the tag string and scores as JSON instead of the bare tag string
    #[arg(long)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the rethreshold command.
pub fn execute(args: RethresholdArgs) -> anyhow::Result<()> {
    let threshold = Threshold::new(args.threshold)?;
    let report = rethreshold(&args.ranked, threshold)?;

    if args.json {
        println!("{}", tagsmith_core::output::to_json(&report, args.pretty)?);
    } else {
        println!("{}", report.tag_string);
    }
    Ok(())
}

fn rethreshold(path: &Path, threshold: Threshold) -> anyhow::Result<TagReport> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read ranked tags {:?}: {e}", path))?;
    let ranked: RankedTags = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid ranked tags in {:?}: {e}", path))?;

    tracing::debug!(
        "Re-filtering {} ranked tags at {}",
        ranked.len(),
        threshold
    );
    Ok(ranked.above(threshold))
}
