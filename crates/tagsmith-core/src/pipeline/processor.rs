//! Pipeline orchestration - wires together all processing stages.
//!
//! ```text
//! ImageSource → read/fetch → validate → decode → preprocess → infer → rank → threshold
//! ```
//!
//! The processor only holds read-only state. Every call produces its own tensor
//! and [`RankedTags`], so one processor can serve any number of concurrent
//! requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::{ConfigError, PipelineError, PipelineResult, Result};
use crate::inference::{OnnxTagger, TagInference};
use crate::preprocess::{Bounds, Preprocessor};
use crate::tagging::{ScoreRanker, TagCatalog, Threshold};
use crate::types::{RankedTags, TagReport, TagSession, TaggedImage};

use super::decode::{format_to_string, ImageDecoder};
use super::discovery::FileDiscovery;
use super::fetch::Fetcher;
use super::source::ImageSource;
use super::validate::Validator;

/// The CPU-bound part of a request: tensor in, ranked tags out.
struct Scorer {
    preprocessor: Preprocessor,
    inference: Arc<dyn TagInference>,
    catalog: Arc<TagCatalog>,
    ranker: ScoreRanker,
}

impl Scorer {
    fn rank(&self, image: &DynamicImage) -> PipelineResult<RankedTags> {
        let start = Instant::now();
        let tensor = self.preprocessor.process(image)?;
        tracing::trace!("  Preprocess: {:?}", start.elapsed());

        let infer_start = Instant::now();
        let probabilities = self.inference.infer(&tensor)?;
        tracing::trace!("  Infer: {:?}", infer_start.elapsed());

        let ranked = self.ranker.rank(&probabilities, &self.catalog)?;
        tracing::trace!("  Rank: {} tags", ranked.len());
        Ok(ranked)
    }
}

/// The main tagging processor that orchestrates the full pipeline.
#[derive(Clone)]
pub struct TagProcessor {
    scorer: Arc<Scorer>,
    decoder: ImageDecoder,
    validator: Validator,
    fetcher: Fetcher,
    discovery: FileDiscovery,
    infer_timeout_ms: u64,
}

impl TagProcessor {
    /// Build a processor around an already-loaded model and catalog.
    ///
    /// Fails if the catalog and the model disagree on the number of tags.
    pub fn new(
        config: &Config,
        catalog: TagCatalog,
        inference: Arc<dyn TagInference>,
    ) -> std::result::Result<Self, ConfigError> {
        catalog.ensure_width(inference.output_width())?;

        Ok(Self {
            scorer: Arc::new(Scorer {
                preprocessor: Preprocessor::new(&config.preprocess),
                inference,
                catalog: Arc::new(catalog),
                ranker: ScoreRanker::new(config.tagging.top_k),
            }),
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            fetcher: Fetcher::new(&config.limits),
            discovery: FileDiscovery::new(config.batch.clone()),
            infer_timeout_ms: config.limits.infer_timeout_ms,
        })
    }

    /// Load the catalog and the ONNX model named by the configuration.
    pub fn load(config: &Config) -> Result<Self> {
        let catalog = TagCatalog::load(&config.catalog_path())?;

        let model_path = config.model_path();
        tracing::info!("Loading tagger model from {:?}", model_path);
        let bounds = Bounds::new(config.preprocess.height, config.preprocess.width);
        let model = OnnxTagger::load(&model_path, bounds)?;

        Ok(Self::new(config, catalog, Arc::new(model))?)
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.scorer.catalog
    }

    /// Preprocess, infer, and rank one decoded image on the current thread.
    pub fn rank_image(&self, image: &DynamicImage) -> PipelineResult<RankedTags> {
        self.scorer.rank(image)
    }

    /// Rank one decoded image and filter it at `threshold`.
    pub fn tag_image(
        &self,
        image: &DynamicImage,
        threshold: Threshold,
    ) -> PipelineResult<(RankedTags, TagReport)> {
        let ranked = self.rank_image(image)?;
        let report = ranked.above(threshold);
        Ok((ranked, report))
    }

    /// Tag an image from a file path or URL.
    pub async fn tag_source(
        &self,
        source: &ImageSource,
        threshold: Threshold,
    ) -> PipelineResult<TagSession> {
        let bytes = self.read_source(source).await?;
        self.tag_bytes(bytes, source, threshold).await
    }

    /// Tag an image whose encoded bytes are already in memory.
    ///
    /// `source` only labels the result and error messages.
    pub async fn tag_bytes(
        &self,
        bytes: Vec<u8>,
        source: &ImageSource,
        threshold: Threshold,
    ) -> PipelineResult<TagSession> {
        let start = Instant::now();
        let input = source.input();
        tracing::debug!("Tagging: {}", input);

        self.validator.check_bytes(&input, &bytes)?;

        let decode_start = Instant::now();
        let decoded = self.decoder.decode_from_bytes(bytes, &input).await?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        let (width, height, format) = (decoded.width, decoded.height, decoded.format);
        let ranked = self.rank_blocking(decoded.image, &input).await?;
        let report = ranked.above(threshold);

        tracing::debug!(
            "Tagged {} in {:?} ({}x{}, {} of {} tags above {})",
            input,
            start.elapsed(),
            width,
            height,
            report.scores.len(),
            ranked.len(),
            threshold
        );

        Ok(TagSession {
            image: TaggedImage {
                input,
                file_name: source.file_name(),
                width,
                height,
                format: format_to_string(format),
                threshold: threshold.value(),
                report,
            },
            ranked,
        })
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        self.discovery.discover(path)
    }

    async fn read_source(&self, source: &ImageSource) -> PipelineResult<Vec<u8>> {
        match source {
            ImageSource::File(path) => {
                self.validator.check_file(path)?;
                tokio::fs::read(path).await.map_err(|e| PipelineError::Decode {
                    input: path.display().to_string(),
                    message: format!("Cannot read file: {e}"),
                })
            }
            ImageSource::Url(url) => self.fetcher.fetch(url).await,
        }
    }

    /// Run the CPU-bound stages off the async runtime, bounded by the inference timeout.
    ///
    /// A timeout only abandons the wait: the blocking task runs to completion and
    /// keeps holding the model (for ONNX, its session mutex) until it does, so
    /// requests issued right after a timeout queue behind it.
    async fn rank_blocking(&self, image: DynamicImage, input: &str) -> PipelineResult<RankedTags> {
        let scorer = Arc::clone(&self.scorer);
        let result = timeout(
            Duration::from_millis(self.infer_timeout_ms),
            tokio::task::spawn_blocking(move || scorer.rank(&image)),
        )
        .await;

        match result {
            Ok(Ok(ranked)) => ranked,
            Ok(Err(e)) => Err(PipelineError::Inference {
                message: format!("Task join error: {e}"),
            }),
            Err(_) => Err(PipelineError::Timeout {
                input: input.to_string(),
                stage: "inference".to_string(),
                timeout_ms: self.infer_timeout_ms,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Axis};
    use std::io::Cursor;

    /// Scores three tags with the mean of each normalized channel, mapped to [0, 1].
    struct ChannelMeans;

    impl TagInference for ChannelMeans {
        fn output_width(&self) -> usize {
            3
        }

        fn infer(&self, tensor: &Array3<f32>) -> PipelineResult<Vec<f32>> {
            Ok(tensor
                .axis_iter(Axis(0))
                .map(|channel| (channel.mean().unwrap_or(0.0) + 1.0) / 2.0)
                .collect())
        }
    }

    fn processor() -> TagProcessor {
        let catalog = TagCatalog::from_names(["red_thing", "green_thing", "blue_thing"]).unwrap();
        TagProcessor::new(&Config::default(), catalog, Arc::new(ChannelMeans)).unwrap()
    }

    fn red_png() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            384,
            384,
            image::Rgb([255, 0, 0]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_new_rejects_catalog_mismatch() {
        let catalog = TagCatalog::from_names(["only", "two"]).unwrap();
        let err = TagProcessor::new(&Config::default(), catalog, Arc::new(ChannelMeans))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::CatalogMismatch {
                catalog: 2,
                model: 3
            }
        ));
    }

    #[test]
    fn test_tag_image_red() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            64,
            64,
            image::Rgb([255, 0, 0]),
        ));
        let (ranked, report) = processor()
            .tag_image(&img, Threshold::new(0.5).unwrap())
            .unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked.tags()[0].name, "red thing");
        assert_eq!(report.tag_string, "red thing");
    }

    #[tokio::test]
    async fn test_tag_bytes_fills_record() {
        let source = ImageSource::parse("/photos/red.png");
        let session = processor()
            .tag_bytes(red_png(), &source, Threshold::default())
            .await
            .unwrap();

        assert_eq!(session.image.file_name, "red.png");
        assert_eq!(session.image.format, "png");
        assert_eq!((session.image.width, session.image.height), (384, 384));
        assert_eq!(session.image.report.tag_string, "red thing");
        assert_eq!(session.ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_tag_source_missing_file() {
        let source = ImageSource::parse("/definitely/not/here.png");
        let err = processor()
            .tag_source(&source, Threshold::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_tag_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        std::fs::write(&path, red_png()).unwrap();

        let session = processor()
            .tag_source(&ImageSource::File(path), Threshold::default())
            .await
            .unwrap();
        assert_eq!(session.image.report.scores.len(), 1);
    }

    /// Sleeps through its first call only.
    struct SlowOnce {
        slept: std::sync::atomic::AtomicBool,
    }

    impl TagInference for SlowOnce {
        fn output_width(&self) -> usize {
            3
        }

        fn infer(&self, tensor: &Array3<f32>) -> PipelineResult<Vec<f32>> {
            if !self.slept.swap(true, std::sync::atomic::Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(300));
            }
            ChannelMeans.infer(tensor)
        }
    }

    #[tokio::test]
    async fn test_inference_timeout_reports_stage_and_recovers() {
        let mut config = Config::default();
        config.limits.infer_timeout_ms = 50;
        let catalog = TagCatalog::from_names(["red_thing", "green_thing", "blue_thing"]).unwrap();
        let model = SlowOnce {
            slept: std::sync::atomic::AtomicBool::new(false),
        };
        let processor = TagProcessor::new(&config, catalog, Arc::new(model)).unwrap();
        let source = ImageSource::parse("/photos/red.png");

        let err = processor
            .tag_bytes(red_png(), &source, Threshold::default())
            .await
            .err()
            .unwrap();
        match err {
            PipelineError::Timeout {
                stage, timeout_ms, ..
            } => {
                assert_eq!(stage, "inference");
                assert_eq!(timeout_ms, 50);
            }
            other => panic!("expected an inference timeout, got {other}"),
        }

        // Let the abandoned task finish, then the same processor serves again.
        tokio::time::sleep(Duration::from_millis(400)).await;
        let session = processor
            .tag_bytes(red_png(), &source, Threshold::default())
            .await
            .unwrap();
        assert_eq!(session.image.report.tag_string, "red thing");
    }

    #[tokio::test]
    async fn test_tag_bytes_rejects_non_image() {
        let source = ImageSource::parse("notes.png");
        let err = processor()
            .tag_bytes(b"hello world".to_vec(), &source, Threshold::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("magic bytes"));
    }
}
