//! Aspect-preserving resize into fixed bounds, with optional letterbox padding.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel, Rgb, Rgba};

use crate::error::{PipelineError, PipelineResult};

/// Target (height, width) an image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub height: u32,
    pub width: u32,
}

impl Bounds {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }
}

/// Resizes an image to fit within [`Bounds`] without changing its aspect ratio.
///
/// The limiting axis lands exactly on its bound; the other axis ends up shorter
/// and, when a pad fill is configured, is padded symmetrically with the odd pixel
/// going to the bottom/right.
#[derive(Debug, Clone)]
pub struct ResizeFit {
    bounds: Bounds,
    filter: FilterType,
    grow: bool,
    pad: Option<u8>,
}

impl ResizeFit {
    /// Lanczos resampling, growth allowed, no padding.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            filter: FilterType::Lanczos3,
            grow: true,
            pad: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// When false, images already inside the bounds are never upscaled.
    pub fn grow(mut self, grow: bool) -> Self {
        self.grow = grow;
        self
    }

    /// Fill value written to every channel of the padding area.
    pub fn pad(mut self, fill: Option<u8>) -> Self {
        self.pad = fill;
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Fit `image` into the bounds.
    ///
    /// Returns the input untouched when the computed scale is exactly 1.0.
    pub fn fit(&self, image: DynamicImage) -> PipelineResult<DynamicImage> {
        let (width, height) = image.dimensions();
        let Bounds {
            height: hbound,
            width: wbound,
        } = self.bounds;

        let degenerate = |new_width: u32, new_height: u32| PipelineError::DegenerateResize {
            width,
            height,
            bound_width: wbound,
            bound_height: hbound,
            new_width,
            new_height,
        };

        if width == 0 || height == 0 || wbound == 0 || hbound == 0 {
            return Err(degenerate(0, 0));
        }

        let mut hscale = f64::from(hbound) / f64::from(height);
        let mut wscale = f64::from(wbound) / f64::from(width);
        if !self.grow {
            hscale = hscale.min(1.0);
            wscale = wscale.min(1.0);
        }

        let scale = hscale.min(wscale);
        if scale == 1.0 {
            return Ok(image);
        }

        // Rounding can overshoot by a pixel on the non-limiting axis.
        let hnew = scaled(height, scale).min(hbound);
        let wnew = scaled(width, scale).min(wbound);
        if hnew == 0 || wnew == 0 {
            return Err(degenerate(wnew, hnew));
        }

        let resized = image.resize_exact(wnew, hnew, self.filter);

        let Some(fill) = self.pad else {
            return Ok(resized);
        };

        let top = (hbound - hnew) / 2;
        let left = (wbound - wnew) / 2;
        Ok(pad(resized, fill, self.bounds, left, top))
    }
}

/// Scale a dimension, rounding half to even.
fn scaled(dim: u32, scale: f64) -> u32 {
    (f64::from(dim) * scale).round_ties_even() as u32
}

fn pad(image: DynamicImage, fill: u8, bounds: Bounds, left: u32, top: u32) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => {
            DynamicImage::ImageRgb8(pad_buffer(&rgb, Rgb([fill; 3]), bounds, left, top))
        }
        other => DynamicImage::ImageRgba8(pad_buffer(
            &other.to_rgba8(),
            Rgba([fill; 4]),
            bounds,
            left,
            top,
        )),
    }
}

fn pad_buffer<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    fill: P,
    bounds: Bounds,
    left: u32,
    top: u32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let mut canvas = ImageBuffer::from_pixel(bounds.width, bounds.height, fill);
    imageops::replace(&mut canvas, image, i64::from(left), i64::from(top));
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    #[test]
    fn test_fit_unit_scale_returns_identical_image() {
        // Height already matches the bound and limits the scale.
        let img = gradient(200, 384);
        let fitted = ResizeFit::new(Bounds::square(384))
            .pad(Some(0))
            .fit(img.clone())
            .unwrap();
        assert_eq!(fitted.dimensions(), (200, 384));
        assert_eq!(fitted.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_fit_no_grow_keeps_small_image() {
        let img = gradient(50, 30);
        let fitted = ResizeFit::new(Bounds::square(384))
            .grow(false)
            .fit(img.clone())
            .unwrap();
        assert_eq!(fitted.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_fit_no_grow_without_pad_keeps_short_axis() {
        let img = gradient(800, 400);
        let fitted = ResizeFit::new(Bounds::square(384))
            .grow(false)
            .fit(img)
            .unwrap();
        // scale = min(384/400, 384/800) = 0.48
        assert_eq!(fitted.dimensions(), (384, 192));
    }

    #[test]
    fn test_fit_grow_upscales_to_bound() {
        let img = gradient(100, 50);
        let fitted = ResizeFit::new(Bounds::square(384)).fit(img).unwrap();
        assert_eq!(fitted.dimensions(), (384, 192));
    }

    #[test]
    fn test_fit_shrinks_even_with_grow() {
        let img = gradient(1000, 1000);
        let fitted = ResizeFit::new(Bounds::square(384)).fit(img).unwrap();
        assert_eq!(fitted.dimensions(), (384, 384));
    }

    #[test]
    fn test_fit_pads_to_exact_bounds() {
        let img = gradient(800, 400);
        let fitted = ResizeFit::new(Bounds::square(384))
            .pad(Some(0))
            .fit(img)
            .unwrap();
        assert_eq!(fitted.dimensions(), (384, 384));
        let rgba = fitted.to_rgba8();
        // 192 rows of padding split 96/96.
        assert_eq!(rgba.get_pixel(10, 95), &Rgba([0, 0, 0, 0]));
        assert_eq!(rgba.get_pixel(10, 96)[3], 255);
        assert_eq!(rgba.get_pixel(10, 287)[3], 255);
        assert_eq!(rgba.get_pixel(10, 288), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_fit_odd_padding_goes_bottom() {
        // 20x6 into 10x10: scale 0.5 -> 10x3, 7 rows of padding -> 3 top, 4 bottom.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 6, Rgba([255; 4])));
        let fitted = ResizeFit::new(Bounds::square(10))
            .pad(Some(0))
            .fit(img)
            .unwrap()
            .to_rgba8();
        assert_eq!(fitted.get_pixel(0, 2)[3], 0);
        assert!(fitted.get_pixel(0, 3)[3] > 0);
        assert!(fitted.get_pixel(0, 5)[3] > 0);
        assert_eq!(fitted.get_pixel(0, 6)[3], 0);
        assert_eq!(fitted.get_pixel(0, 9)[3], 0);
    }

    #[test]
    fn test_fit_pad_fill_applies_to_all_channels() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 6, Rgb([10, 20, 30])));
        let fitted = ResizeFit::new(Bounds::square(10))
            .pad(Some(7))
            .fit(img)
            .unwrap();
        assert!(matches!(fitted, DynamicImage::ImageRgb8(_)));
        assert_eq!(fitted.to_rgb8().get_pixel(0, 0), &Rgb([7, 7, 7]));
    }

    #[test]
    fn test_fit_rounds_half_to_even() {
        // 20x5 at scale 0.5 -> height 2.5 rounds to 2.
        let img = gradient(20, 5);
        let fitted = ResizeFit::new(Bounds::square(10)).fit(img).unwrap();
        assert_eq!(fitted.dimensions(), (10, 2));
    }

    #[test]
    fn test_fit_zero_bounds_is_error() {
        let err = ResizeFit::new(Bounds::new(0, 384))
            .fit(gradient(10, 10))
            .unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateResize { .. }));
    }

    #[test]
    fn test_fit_pathological_aspect_is_error() {
        // 10000x1 into 8x8: height rounds to zero.
        let img = gradient(10000, 1);
        let err = ResizeFit::new(Bounds::square(8)).fit(img).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DegenerateResize { new_height: 0, .. }
        ));
    }
}
