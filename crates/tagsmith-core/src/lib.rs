//! Tagsmith Core - multi-label image tagging library.
//!
//! Tagsmith turns an image into a ranked set of textual tags with confidence
//! scores, using an ONNX multi-label classifier and a JSON tag catalog.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode → Preprocess (fit, composite, normalize, crop) → Infer → Top-k → Threshold → JSON/CSV
//! ```
//!
//! Preprocessing and score postprocessing are pure and deterministic. The model
//! is behind the [`TagInference`] trait, and every request owns its results:
//! [`RankedTags`] is handed back to the caller, who can re-filter it at another
//! threshold without running inference again.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tagsmith_core::{Config, ImageSource, TagProcessor, Threshold};
//!
//! #[tokio::main]
//! async fn main() -> tagsmith_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = TagProcessor::load(&config)?;
//!
//!     let session = processor
//!         .tag_source(&ImageSource::parse("./image.jpg"), Threshold::new(0.2)?)
//!         .await?;
//!     println!("Tags: {}", session.image.report.tag_string);
//!
//!     let stricter = session.ranked.above(Threshold::new(0.5)?);
//!     println!("Confident: {}", stricter.tag_string);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod tagging;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, TagsmithError};
pub use inference::{OnnxTagger, TagInference};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{ImageSource, TagProcessor};
pub use preprocess::Preprocessor;
pub use tagging::{ScoreRanker, TagCatalog, Threshold};
pub use types::{
    FailedInput, OutputRecord, ProcessingStats, RankedTags, ScoredTag, TagReport, TagSession,
    TaggedImage,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
