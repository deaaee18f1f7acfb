//! Threshold filtering of ranked tags.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{RankedTags, TagReport};

/// A validated cut-off probability in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Threshold(f32);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(0.20);

    /// Rejects NaN and anything outside `[0.0, 1.0]`.
    pub fn new(value: f32) -> PipelineResult<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PipelineError::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Threshold {
    type Error = PipelineError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f32 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Keep tags scoring strictly above `threshold`, in rank order.
///
/// Total over every `f32`: no validation happens here, so a threshold below
/// zero keeps everything and NaN keeps nothing. Callers taking user input go
/// through [`Threshold`] first.
pub fn filter(ranked: &RankedTags, threshold: f32) -> TagReport {
    let scores: IndexMap<String, f32> = ranked
        .iter()
        .filter(|tag| tag.score > threshold)
        .map(|tag| (tag.name.clone(), tag.score))
        .collect();

    let tag_string = scores
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    TagReport { tag_string, scores }
}

impl RankedTags {
    /// Filter these tags at a validated threshold.
    pub fn above(&self, threshold: Threshold) -> TagReport {
        filter(self, threshold.value())
    }
}
