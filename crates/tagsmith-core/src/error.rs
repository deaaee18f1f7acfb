//! Error types for the Tagsmith tagging pipeline.
//!
//! Errors are split by when they can happen: configuration errors abort start-up,
//! pipeline errors are reported per request and never touch shared state.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Tagsmith operations.
#[derive(Error, Debug)]
pub enum TagsmithError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors. All of these are fatal at start-up.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The tag catalog could not be loaded
    #[error("Tag catalog {path}: {message}")]
    Catalog { path: PathBuf, message: String },

    /// Catalog and model disagree on the number of tag ordinals
    #[error("Tag catalog has {catalog} tags but the model outputs {model} scores")]
    CatalogMismatch { catalog: usize, model: usize },
}

/// Per-request pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {input}: {message}")]
    Decode { input: String, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {input}: {format}")]
    UnsupportedFormat { input: String, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input exceeds size limit
    #[error("File too large: {input} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        input: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {input} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        input: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Downloading a URL input failed
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {input} after {timeout_ms}ms")]
    Timeout {
        input: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Resizing would produce an empty image
    #[error(
        "Degenerate resize: {width}x{height} image into {bound_width}x{bound_height} bounds gives {new_width}x{new_height}"
    )]
    DegenerateResize {
        width: u32,
        height: u32,
        bound_width: u32,
        bound_height: u32,
        new_width: u32,
        new_height: u32,
    },

    /// Threshold is not a probability
    #[error("Invalid threshold {0}: must be a number between 0.0 and 1.0")]
    InvalidThreshold(f32),

    /// Tensor conversion or shape problem
    #[error("Preprocessing failed: {message}")]
    Preprocess { message: String },

    /// The inference collaborator failed or returned unusable scores
    #[error("Inference failed: {message}")]
    Inference { message: String },

    /// Model files missing or unloadable
    #[error("Model error for {path}: {message}")]
    Model { path: PathBuf, message: String },
}

/// Convenience type alias for Tagsmith results.
pub type Result<T> = std::result::Result<T, TagsmithError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
