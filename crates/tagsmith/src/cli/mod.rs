//! CLI command implementations and the helpers they share.

pub mod batch;
pub mod config;
pub mod models;
pub mod rethreshold;
pub mod tag;
pub mod types;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tagsmith_core::{Config, ImageSource, OutputFormat, OutputWriter, TagProcessor, Threshold};

/// Validate the threshold from the command line, or fall back to the config value.
pub(crate) fn resolve_threshold(cli: Option<f32>, config: &Config) -> anyhow::Result<Threshold> {
    let value = cli.unwrap_or(config.tagging.threshold);
    Ok(Threshold::new(value)?)
}

/// Apply a `--top-k` override.
pub(crate) fn apply_top_k(config: &mut Config, top_k: Option<usize>) -> anyhow::Result<()> {
    match top_k {
        Some(0) => anyhow::bail!("--top-k must be at least 1"),
        Some(k) => config.tagging.top_k = k,
        None => {}
    }
    Ok(())
}

/// Load the model and catalog, with a hint pointing at `tagsmith models`.
pub(crate) fn load_processor(config: &Config) -> anyhow::Result<TagProcessor> {
    TagProcessor::load(config).map_err(|e| {
        anyhow::anyhow!(
            "{e}\n\n  Hint: Run `tagsmith models path` to see where the model and tag catalog are expected."
        )
    })
}

/// Output writer to a file, or to stdout when no path is given.
pub(crate) fn open_writer(
    output: Option<&Path>,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<OutputWriter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(OutputWriter::new(sink, format, pretty))
}

/// Where the caption sidecar for `source` goes.
///
/// An explicit directory always wins. Otherwise files get their caption next
/// to the image, and URLs get none.
pub(crate) fn caption_dir(source: &ImageSource, dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = dir {
        return Some(dir.to_path_buf());
    }
    match source {
        ImageSource::File(path) => Some(
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        ),
        ImageSource::Url(_) => None,
    }
}

/// Write the caption sidecar for one tagged image, logging instead of failing.
pub(crate) fn write_caption(source: &ImageSource, dir: Option<&Path>, tag_string: &str) {
    let Some(target) = caption_dir(source, dir) else {
        tracing::warn!("No caption directory for URL input {source}; pass --captions DIR");
        return;
    };
    if let Err(e) = std::fs::create_dir_all(&target) {
        tracing::warn!("Cannot create caption directory {:?}: {e}", target);
        return;
    }
    match tagsmith_core::output::write_caption(&target, &source.stem(), tag_string) {
        Ok(path) => tracing::debug!("Caption written to {:?}", path),
        Err(e) => tracing::warn!("Failed to write caption for {source}: {e}"),
    }
}
