//! Image tagging pipeline components.
//!
//! - **source**: File path or URL inputs
//! - **fetch**: Downloading URL inputs
//! - **validate**: Size and magic-byte checks before decoding
//! - **decode**: Decoding with format detection and timeouts
//! - **discovery**: Finding image files in directories
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod discovery;
pub mod fetch;
pub mod processor;
pub mod source;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use fetch::Fetcher;
pub use processor::TagProcessor;
pub use source::ImageSource;
pub use validate::Validator;
