//! Sub-configuration structs with defaults matching the shipped tagger.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.tagsmith/models"),
        }
    }
}

/// Model and tag catalog file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Subdirectory of `model_dir` holding this model
    pub name: String,

    /// ONNX export of the tagger (probabilities as first output)
    pub model_file: String,

    /// JSON object whose keys are the tag identifiers in output order
    pub catalog_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "jtp-pilot2".to_string(),
            model_file: "model.onnx".to_string(),
            catalog_file: "tags.json".to_string(),
        }
    }
}

/// Background fill for alpha compositing: one value for all channels or explicit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Background {
    Uniform(f32),
    Rgb([f32; 3]),
}

impl Background {
    /// Per-channel background values.
    pub fn rgb(self) -> [f32; 3] {
        match self {
            Background::Uniform(v) => [v; 3],
            Background::Rgb(rgb) => rgb,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Uniform(0.5)
    }
}

impl From<f32> for Background {
    fn from(value: f32) -> Self {
        Background::Uniform(value)
    }
}

impl From<[f32; 3]> for Background {
    fn from(value: [f32; 3]) -> Self {
        Background::Rgb(value)
    }
}

/// Image-to-tensor preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Target height (fit bound and crop height)
    pub height: u32,

    /// Target width (fit bound and crop width)
    pub width: u32,

    /// Allow upscaling images smaller than the bounds
    pub grow: bool,

    /// Fill value for letterbox padding; `None` leaves the fitted image unpadded
    pub pad: Option<u8>,

    /// Per-channel normalization mean
    pub mean: [f32; 3],

    /// Per-channel normalization std
    pub std: [f32; 3],

    /// Background that transparent pixels are flattened onto
    pub background: Background,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            height: 384,
            width: 384,
            grow: true,
            pad: Some(0),
            mean: [0.5; 3],
            std: [0.5; 3],
            background: Background::default(),
        }
    }
}

/// Ranking and threshold settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Number of highest-scoring tags kept per image
    pub top_k: usize,

    /// Default threshold; tags must score strictly above it
    pub threshold: f32,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            top_k: 250,
            threshold: 0.20,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Preprocess + inference timeout in milliseconds
    pub infer_timeout_ms: u64,

    /// URL download timeout in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            infer_timeout_ms: 30000,
            fetch_timeout_ms: 10000,
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of images tagged concurrently
    pub parallel_workers: usize,

    /// Descend into subdirectories when tagging a folder
    pub recursive: bool,

    /// File extensions picked up from folders
    pub supported_formats: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            recursive: false,
            supported_formats: ["jpg", "jpeg", "png", "bmp", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json", "jsonl" or "csv")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
