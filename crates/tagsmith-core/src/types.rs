//! Core data types for the Tagsmith tagging pipeline.
//!
//! Every value here is request-scoped: it is produced for one image and handed
//! back to the caller, never cached inside the library.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A tag display name with its probability for the current image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTag {
    /// Display name (underscores already replaced with spaces)
    pub name: String,

    /// Model probability from 0.0 to 1.0
    pub score: f32,
}

impl ScoredTag {
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Top-k tags of one image, in descending score order.
///
/// This is the state a caller keeps to re-filter at another threshold without
/// running inference again. It serializes as a plain JSON array; deserializing
/// rejects arrays that are not sorted descending or hold scores outside [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScoredTag>", into = "Vec<ScoredTag>")]
pub struct RankedTags {
    tags: Vec<ScoredTag>,
}

impl RankedTags {
    /// Wrap tags the ranker already ordered.
    pub(crate) fn from_sorted(tags: Vec<ScoredTag>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[ScoredTag] {
        &self.tags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TryFrom<Vec<ScoredTag>> for RankedTags {
    type Error = String;

    fn try_from(tags: Vec<ScoredTag>) -> Result<Self, Self::Error> {
        if let Some(bad) = tags.iter().find(|t| !(0.0..=1.0).contains(&t.score)) {
            return Err(format!("score {} for {:?} is not a probability", bad.score, bad.name));
        }
        if tags.windows(2).any(|pair| pair[0].score < pair[1].score) {
            return Err("ranked tags must be sorted by descending score".to_string());
        }
        Ok(Self { tags })
    }
}

impl From<RankedTags> for Vec<ScoredTag> {
    fn from(ranked: RankedTags) -> Self {
        ranked.tags
    }
}

impl<'a> IntoIterator for &'a RankedTags {
    type Item = &'a ScoredTag;
    type IntoIter = std::slice::Iter<'a, ScoredTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// The render payload for one image: comma-joined tag string plus ordered scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagReport {
    /// Surviving display names joined with ", "
    pub tag_string: String,

    /// Display name -> score, highest first
    pub scores: IndexMap<String, f32>,
}

impl TagReport {
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Split into the `(tag string, scores)` pair a display surface renders.
    pub fn into_parts(self) -> (String, IndexMap<String, f32>) {
        (self.tag_string, self.scores)
    }
}

/// The output record for one tagged image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedImage {
    /// File path or URL the image came from
    pub input: String,

    /// File name portion of the input
    pub file_name: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", etc.)
    pub format: String,

    /// Threshold the report was filtered with
    pub threshold: f32,

    /// Tags scoring strictly above the threshold
    #[serde(flatten)]
    pub report: TagReport,
}

/// One request's result together with the ranked tags it was filtered from.
#[derive(Debug, Clone)]
pub struct TagSession {
    pub image: TaggedImage,
    pub ranked: RankedTags,
}

/// An input that could not be tagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedInput {
    pub input: String,
    pub error: String,
}

/// Tagged union for batch output.
/// Internally tagged: `{"status":"tagged",...}` or `{"status":"failed",...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutputRecord {
    Tagged(Box<TaggedImage>),
    Failed(FailedInput),
}

impl OutputRecord {
    pub fn input(&self) -> &str {
        match self {
            OutputRecord::Tagged(image) => &image.input,
            OutputRecord::Failed(failed) => &failed.input,
        }
    }
}

/// Processing statistics for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Total images tagged successfully
    pub succeeded: usize,

    /// Total inputs that failed
    pub failed: usize,

    /// Processing rate in images per second
    pub images_per_second: f64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}
