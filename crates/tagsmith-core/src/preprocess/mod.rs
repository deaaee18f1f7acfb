//! Deterministic image-to-tensor preprocessing for the tagger.
//!
//! The tagger (SigLIP so400m/14 at 384px) expects:
//! - Input size: 384×384 pixels, aspect preserved by letterboxing
//! - Transparency flattened onto mid-gray
//! - Normalization: pixels scaled to [-1, 1] via (pixel/255 - 0.5) / 0.5
//! - Tensor layout: CHW, batched to NCHW by the inference collaborator
//!
//! The stages always run in the same order:
//!
//! ```text
//! RGBA → ResizeFit → to_tensor → AlphaCompositor → normalize → center_crop
//! ```

pub mod composite;
pub mod fit;
pub mod tensor;

use image::DynamicImage;
use ndarray::Array3;

use crate::config::PreprocessConfig;
use crate::error::PipelineResult;

pub use composite::AlphaCompositor;
pub use fit::{Bounds, ResizeFit};

use self::tensor::{center_crop, normalize, to_tensor};

/// The fixed preprocessing pipeline from decoded image to model input tensor.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    fit: ResizeFit,
    compositor: AlphaCompositor,
    mean: [f32; 3],
    std: [f32; 3],
    crop: Bounds,
}

impl Preprocessor {
    pub fn new(config: &PreprocessConfig) -> Self {
        let bounds = Bounds::new(config.height, config.width);
        Self {
            fit: ResizeFit::new(bounds).grow(config.grow).pad(config.pad),
            compositor: AlphaCompositor::new(config.background),
            mean: config.mean,
            std: config.std,
            crop: bounds,
        }
    }

    /// Output spatial size of every tensor this pipeline produces.
    pub fn bounds(&self) -> Bounds {
        self.crop
    }

    /// Turn a decoded image into a `(3, height, width)` tensor.
    ///
    /// Pure: identical images and configuration give bit-identical tensors.
    pub fn process(&self, image: &DynamicImage) -> PipelineResult<Array3<f32>> {
        let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
        let fitted = self.fit.fit(rgba)?;
        let mut tensor = self.compositor.composite(to_tensor(&fitted))?;
        normalize(&mut tensor, self.mean, self.std);
        Ok(center_crop(tensor, self.crop))
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(&PreprocessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn assert_model_ready(tensor: &Array3<f32>) {
        assert_eq!(tensor.shape(), &[3, 384, 384]);
        assert!(tensor.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_process_shape_and_range_for_various_sizes() {
        let preprocessor = Preprocessor::default();
        for (w, h) in [(640, 480), (480, 640), (384, 384), (1, 1), (2000, 30), (200, 384)] {
            let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
                Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 255])
            }));
            let tensor = preprocessor.process(&img).unwrap();
            assert_model_ready(&tensor);
        }
    }

    #[test]
    fn test_process_normalization_extremes() {
        let preprocessor = Preprocessor::default();

        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(384, 384, Rgb([255; 3])));
        let tensor = preprocessor.process(&white).unwrap();
        assert!(tensor.iter().all(|&v| v == 1.0));

        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(384, 384, Rgb([0; 3])));
        let tensor = preprocessor.process(&black).unwrap();
        assert!(tensor.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_transparent_image_becomes_mid_gray() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(384, 384, Rgba([255, 0, 0, 0])));
        let tensor = Preprocessor::default().process(&clear).unwrap();
        assert!(tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_non_square_input_shows_gray_bars() {
        let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 400, Rgb([255, 0, 0])));
        let tensor = Preprocessor::default().process(&red).unwrap();
        assert_model_ready(&tensor);
        // Transparent padding composites to 0.5, which normalizes to 0.0.
        for c in 0..3 {
            assert_eq!(tensor[[c, 0, 0]], 0.0);
            assert_eq!(tensor[[c, 383, 383]], 0.0);
        }
        assert!((tensor[[0, 192, 192]] - 1.0).abs() < 0.02);
        assert!((tensor[[1, 192, 192]] + 1.0).abs() < 0.02);
    }

    #[test]
    fn test_unit_scale_input_is_center_padded() {
        // 200x384 fits exactly on height, so it skips resize and padding;
        // the crop stage centers it.
        let blue = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 384, Rgb([0, 0, 255])));
        let tensor = Preprocessor::default().process(&blue).unwrap();
        assert_model_ready(&tensor);
        assert_eq!(tensor[[2, 0, 0]], 0.0);
        assert_eq!(tensor[[2, 0, 92]], 1.0);
        assert_eq!(tensor[[2, 0, 291]], 1.0);
        assert_eq!(tensor[[2, 0, 292]], 0.0);
    }

    #[test]
    fn test_process_is_deterministic() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(123, 77, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, ((x * y) % 256) as u8])
        }));
        let preprocessor = Preprocessor::default();
        let a = preprocessor.process(&img).unwrap();
        let b = preprocessor.process(&img).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_bounds() {
        let config = PreprocessConfig {
            height: 224,
            width: 160,
            ..PreprocessConfig::default()
        };
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = Preprocessor::new(&config).process(&img).unwrap();
        assert_eq!(tensor.shape(), &[3, 224, 160]);
    }
}
