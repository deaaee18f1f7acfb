//! The `tagsmith batch` command: a folder or list file with bounded concurrency and progress.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use futures_util::stream::{self, StreamExt};
use tagsmith_core::pipeline::FileDiscovery;
use tagsmith_core::{
    Config, FailedInput, ImageSource, OutputRecord, ProcessingStats, TagProcessor, Threshold,
};

use super::types::OutputFormat;

/// Arguments for the `batch` command.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder of images, or a text file listing image paths/URLs (one per line)
    #[arg(required = true)]
    pub input: PathBuf,

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

    /// Number of images tagged concurrently
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Descend into subfolders
    #[arg(short, long)]
    pub recursive: bool,

    /// Write a `<name>.txt` caption next to each image, or into DIR
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub captions: Option<Option<PathBuf>>,
}

/// Execute the batch command.
pub async fn execute(args: BatchArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(workers) = args.parallel {
        if workers == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.batch.parallel_workers = workers;
    }
    if args.recursive {
        config.batch.recursive = true;
    }
    let threshold = super::resolve_threshold(args.threshold, &config)?;
    super::apply_top_k(&mut config, args.top_k)?;
    let format = OutputFormat::resolve(args.format, &config.output.format);

    let sources = collect_sources(&args.input, &config)?;
    if sources.is_empty() {
        tracing::warn!("No supported images found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to tag", sources.len());

    let processor = super::load_processor(&config)?;
    let (records, stats) = tag_all(
        &processor,
        sources,
        threshold,
        config.batch.parallel_workers,
        args.captions.as_ref().map(|dir| dir.as_deref()),
    )
    .await;

    let pretty = args.pretty || config.output.pretty;
    let mut writer = super::open_writer(args.output.as_deref(), format, pretty)?;
    writer.write_records(&records)?;
    writer.flush()?;
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    print_summary(&stats);
    Ok(())
}

/// Inputs for a batch: the images in a folder, or the entries of a list file.
fn collect_sources(input: &Path, config: &Config) -> anyhow::Result<Vec<ImageSource>> {
    if input.is_dir() {
        let files = FileDiscovery::new(config.batch.clone()).discover(input);
        return Ok(files.into_iter().map(ImageSource::File).collect());
    }
    if input.is_file() {
        return ImageSource::read_list(input)
            .map_err(|e| anyhow::anyhow!("Cannot read input list {:?}: {e}", input));
    }
    anyhow::bail!(
        "Input path does not exist: {:?}\n\n  Hint: Pass a folder of images or a text file of paths/URLs.",
        input
    )
}

/// Tag every source with at most `workers` in flight.
///
/// Records come back in input order. A failed input becomes a failure record
/// and never stops the batch.
async fn tag_all(
    processor: &TagProcessor,
    sources: Vec<ImageSource>,
    threshold: Threshold,
    workers: usize,
    captions: Option<Option<&Path>>,
) -> (Vec<OutputRecord>, ProcessingStats) {
    let progress = create_progress_bar(sources.len() as u64);
    let start_time = Instant::now();

    let mut outcomes: Vec<(usize, OutputRecord)> = stream::iter(sources.into_iter().enumerate())
        .map(|(index, source)| async move {
            let result = processor.tag_source(&source, threshold).await;
            (index, source, result)
        })
        .buffer_unordered(workers.max(1))
        .map(|(index, source, result)| {
            progress.inc(1);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.1} img/sec", progress.position() as f64 / elapsed));
            }

            let record = match result {
                Ok(session) => {
                    if let Some(dir) = captions {
                        super::write_caption(&source, dir, &session.image.report.tag_string);
                    }
                    OutputRecord::Tagged(Box::new(session.image))
                }
                Err(e) => {
                    tracing::error!("Failed: {} - {}", source, e);
                    OutputRecord::Failed(FailedInput {
                        input: source.input(),
                        error: e.to_string(),
                    })
                }
            };
            (index, record)
        })
        .collect()
        .await;

    progress.finish_and_clear();
    outcomes.sort_by_key(|(index, _)| *index);

    let records: Vec<OutputRecord> = outcomes.into_iter().map(|(_, record)| record).collect();
    let stats = summarize(&records, start_time.elapsed().as_secs_f64());
    (records, stats)
}

fn summarize(records: &[OutputRecord], total_seconds: f64) -> ProcessingStats {
    let succeeded = records
        .iter()
        .filter(|r| matches!(r, OutputRecord::Tagged(_)))
        .count();
    let failed = records.len() - succeeded;
    let images_per_second = if total_seconds > 0.0 {
        succeeded as f64 / total_seconds
    } else {
        0.0
    };

    ProcessingStats {
        succeeded,
        failed,
        images_per_second,
        total_seconds,
    }
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
fn print_summary(stats: &ProcessingStats) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Tagged:       {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.succeeded + stats.failed);
    eprintln!("    Duration:     {:>7.1}s", stats.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", stats.images_per_second);
    eprintln!("  ====================================");
}
