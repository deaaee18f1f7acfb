//! The model behind the tagger.
//!
//! The pipeline only needs an opaque `tensor -> probabilities` function, so the
//! model sits behind [`TagInference`]. [`OnnxTagger`] is the ONNX Runtime
//! implementation; tests plug in deterministic stubs.

mod onnx;

use ndarray::Array3;

use crate::error::PipelineResult;

pub use onnx::OnnxTagger;

/// A multi-label classifier producing one probability per catalog ordinal.
///
/// Implementations are shared across concurrent requests and must not keep
/// per-request state.
pub trait TagInference: Send + Sync {
    /// Length of every probability vector this model returns.
    fn output_width(&self) -> usize;

    /// Score one preprocessed `(3, height, width)` tensor.
    fn infer(&self, tensor: &Array3<f32>) -> PipelineResult<Vec<f32>>;
}
