//! Flattening of RGBA tensors onto a solid background.

use ndarray::{Array, Axis, Dimension, RemoveAxis, Zip};

use crate::config::Background;
use crate::error::{PipelineError, PipelineResult};

/// Composites the alpha channel of a channel-first tensor onto a background colour.
#[derive(Debug, Clone, Copy)]
pub struct AlphaCompositor {
    background: [f32; 3],
}

impl AlphaCompositor {
    pub fn new(background: impl Into<Background>) -> Self {
        Self {
            background: background.into().rgb(),
        }
    }

    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    /// Flatten `tensor` to RGB.
    ///
    /// The channel axis is the first of the last three axes (`[.., C, H, W]`), so
    /// batched tensors work too. Three-channel input is returned as is; for four
    /// channels `rgb * alpha + background * (1 - alpha)` is computed and alpha dropped.
    pub fn composite<D>(&self, tensor: Array<f32, D>) -> PipelineResult<Array<f32, D>>
    where
        D: Dimension + RemoveAxis,
    {
        let ndim = tensor.ndim();
        if ndim < 3 {
            return Err(PipelineError::Preprocess {
                message: format!("expected a [.., C, H, W] tensor, got shape {:?}", tensor.shape()),
            });
        }

        let channel_axis = Axis(ndim - 3);
        match tensor.len_of(channel_axis) {
            3 => Ok(tensor),
            4 => {
                let alpha = tensor.index_axis(channel_axis, 3);
                let mut shape = tensor.raw_dim();
                shape[ndim - 3] = 3;
                let mut rgb = Array::<f32, D>::zeros(shape);

                for (c, plane) in rgb.axis_iter_mut(channel_axis).enumerate() {
                    let bg = self.background[c];
                    Zip::from(plane)
                        .and(tensor.index_axis(channel_axis, c))
                        .and(&alpha)
                        .for_each(|out, &value, &a| *out = value * a + bg * (1.0 - a));
                }
                Ok(rgb)
            }
            n => Err(PipelineError::Preprocess {
                message: format!("expected 3 or 4 channels, got {n}"),
            }),
        }
    }
}

impl Default for AlphaCompositor {
    fn default() -> Self {
        Self::new(Background::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};

    fn pixel(values: [f32; 4]) -> Array3<f32> {
        Array3::from_shape_vec((4, 1, 1), values.to_vec()).unwrap()
    }

    #[test]
    fn test_transparent_pixel_shows_background() {
        let out = AlphaCompositor::new(0.5)
            .composite(pixel([1.0, 0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(out.shape(), &[3, 1, 1]);
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_opaque_pixel_keeps_colour() {
        let out = AlphaCompositor::new(0.5)
            .composite(pixel([1.0, 0.25, 0.0, 1.0]))
            .unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![1.0, 0.25, 0.0]);
    }

    #[test]
    fn test_half_alpha_blends_per_channel_background() {
        let out = AlphaCompositor::new([1.0, 0.0, 0.5])
            .composite(pixel([0.0, 1.0, 0.5, 0.5]))
            .unwrap();
        let values: Vec<f32> = out.iter().copied().collect();
        assert!((values[0] - 0.5).abs() < 1e-6);
        assert!((values[1] - 0.5).abs() < 1e-6);
        assert!((values[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_three_channels_is_noop_and_idempotent() {
        let rgb = Array3::from_shape_fn((3, 4, 5), |(c, y, x)| (c + y + x) as f32 / 10.0);
        let compositor = AlphaCompositor::default();
        let once = compositor.composite(rgb.clone()).unwrap();
        assert_eq!(once, rgb);
        let twice = compositor.composite(once.clone()).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_composite_of_rgba_is_idempotent() {
        let rgba = Array3::from_shape_fn((4, 2, 2), |(c, y, x)| ((c + y + x) % 3) as f32 / 2.0);
        let compositor = AlphaCompositor::default();
        let once = compositor.composite(rgba).unwrap();
        assert_eq!(compositor.composite(once.clone()).unwrap(), once);
    }

    #[test]
    fn test_batched_tensor_uses_channel_axis() {
        let mut batch = Array4::<f32>::ones((2, 4, 3, 3));
        batch.index_axis_mut(Axis(1), 3).fill(0.0);
        let out = AlphaCompositor::new(0.25).composite(batch).unwrap();
        assert_eq!(out.shape(), &[2, 3, 3, 3]);
        assert!(out.iter().all(|&v| (v - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_unexpected_channel_count_is_error() {
        let two = Array3::<f32>::zeros((2, 4, 4));
        let err = AlphaCompositor::default().composite(two).unwrap_err();
        assert!(err.to_string().contains("3 or 4 channels"));
    }
}
