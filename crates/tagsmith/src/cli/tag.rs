//! The `tagsmith tag` command for tagging a single image.

use std::path::PathBuf;

use clap::Args;
use tagsmith_core::{Config, ImageSource, OutputRecord};

use super::types::OutputFormat;

/// Arguments for the `tag` command.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Image file path or http(s) URL
    #[arg(required = true)]
    pub input: String,

    /// Keep tags scoring strictly above this probability (0.0 - 1.0)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Number of top-ranked tags considered before thresholding
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Save the full ranking so `tagsmith rethreshold` can re-filter it later
    #[arg(long, value_name = "FILE")]
    pub save_ranked: Option<PathBuf>,

    /// Write a `<name>.txt` caption next to the image, or into DIR
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub captions: Option<Option<PathBuf>>,
}

/// Execute the tag command.
pub async fn execute(args: TagArgs, mut config: Config) -> anyhow::Result<()> {
    let source = ImageSource::parse(&args.input);
    if let ImageSource::File(path) = &source {
        if !path.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                path
            );
        }
    }

    let threshold = super::resolve_threshold(args.threshold, &config)?;
    super::apply_top_k(&mut config, args.top_k)?;
    let format = OutputFormat::resolve(args.format, &config.output.format);

    let processor = super::load_processor(&config)?;
    let session = processor.tag_source(&source, threshold).await?;

    if let Some(path) = &args.save_ranked {
        std::fs::write(path, serde_json::to_string_pretty(&session.ranked)?)?;
        tracing::info!("Ranked tags saved to {:?}", path);
    }

    if let Some(dir) = &args.captions {
        super::write_caption(&source, dir.as_deref(), &session.image.report.tag_string);
    }

    let record = OutputRecord::Tagged(Box::new(session.image));
    let pretty = args.pretty || config.output.pretty;
    let mut writer = super::open_writer(args.output.as_deref(), format, pretty)?;
    writer.write_record(&record)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    Ok(())
}
