//! Turning model probabilities into tags.
//!
//! ```text
//! probabilities ─► ScoreRanker (top-k) ─► RankedTags ─► filter(threshold) ─► TagReport
//! ```
//!
//! `RankedTags` is request-scoped: callers hold on to it to re-filter at a new
//! threshold without re-running inference.

pub mod catalog;
pub mod ranker;
pub mod threshold;

pub use catalog::{CatalogTag, TagCatalog};
pub use ranker::ScoreRanker;
pub use threshold::{filter, Threshold};
