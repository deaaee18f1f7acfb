//! ONNX Runtime session management for the tagger model.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array3;
use ort::session::Session;
use ort::value::Value;

use crate::error::{PipelineError, PipelineResult};
use crate::preprocess::Bounds;

use super::TagInference;

/// Wraps an ONNX Runtime session for the tagger.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxTagger {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    output_width: usize,
    path: PathBuf,
}

impl OnnxTagger {
    /// Load a tagger model and discover its output width.
    ///
    /// The width is found by scoring an all-zero tensor of the configured
    /// input size, which also surfaces input-shape mismatches at start-up
    /// instead of on the first request.
    pub fn load(model_path: &Path, bounds: Bounds) -> PipelineResult<Self> {
        if !model_path.exists() {
            return Err(PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Model not found. See `tagsmith models path`.".to_string(),
            });
        }

        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());

        tracing::debug!(
            "Loaded tagger model from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        let mut tagger = Self {
            session: Mutex::new(session),
            input_name,
            output_width: 0,
            path: model_path.to_path_buf(),
        };

        let probe = Array3::<f32>::zeros((3, bounds.height as usize, bounds.width as usize));
        tagger.output_width = tagger.run(&probe)?.len();
        if tagger.output_width == 0 {
            return Err(PipelineError::Model {
                path: tagger.path.clone(),
                message: "Model produced an empty output".to_string(),
            });
        }

        tracing::info!(
            "Tagger model ready: {} outputs for {}x{} input",
            tagger.output_width,
            bounds.width,
            bounds.height
        );
        Ok(tagger)
    }

    /// Path the model was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, tensor: &Array3<f32>) -> PipelineResult<Vec<f32>> {
        // Batch of one: [1, 3, H, W], handed to ort as (shape, flat data).
        let shape: Vec<i64> = std::iter::once(1)
            .chain(tensor.shape().iter().map(|&d| d as i64))
            .collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Inference {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Inference {
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Inference {
            message: format!("ONNX inference failed: {e}"),
        })?;

        let (_, first) = outputs
            .iter()
            .next()
            .ok_or_else(|| PipelineError::Inference {
                message: "Model produced no outputs".to_string(),
            })?;

        let (shape, data) =
            first
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Inference {
                    message: format!("Failed to extract output tensor: {e}"),
                })?;

        // [N] or [1, N]
        match shape.len() {
            1 => Ok(data.to_vec()),
            2 if shape[0] == 1 => Ok(data.to_vec()),
            _ => Err(PipelineError::Inference {
                message: format!("Unexpected output shape: {:?}", shape),
            }),
        }
    }
}

impl TagInference for OnnxTagger {
    fn output_width(&self) -> usize {
        self.output_width
    }

    fn infer(&self, tensor: &Array3<f32>) -> PipelineResult<Vec<f32>> {
        let scores = self.run(tensor)?;
        if scores.len() != self.output_width {
            return Err(PipelineError::Inference {
                message: format!(
                    "Model returned {} scores, expected {}",
                    scores.len(),
                    self.output_width
                ),
            });
        }
        Ok(scores)
    }
}
