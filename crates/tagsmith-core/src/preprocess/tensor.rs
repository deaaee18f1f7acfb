//! Image-to-tensor conversion, channel normalization and center cropping.

use std::ops::Range;

use image::{DynamicImage, ImageBuffer, Pixel};
use ndarray::{s, Array3, Axis};

use super::fit::Bounds;

/// Convert an image to a CHW float tensor scaled to [0, 1].
///
/// Images with an alpha channel become 4-channel tensors, everything else RGB.
pub fn to_tensor(image: &DynamicImage) -> Array3<f32> {
    if image.color().has_alpha() {
        planar(&image.to_rgba8())
    } else {
        planar(&image.to_rgb8())
    }
}

fn planar<P>(buffer: &ImageBuffer<P, Vec<u8>>) -> Array3<f32>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = buffer.dimensions();
    let (width, height) = (width as usize, height as usize);
    let channels = usize::from(P::CHANNEL_COUNT);
    let raw = buffer.as_raw();

    Array3::from_shape_fn((channels, height, width), |(c, y, x)| {
        f32::from(raw[(y * width + x) * channels + c]) / 255.0
    })
}

/// Per-channel `(x - mean) / std`, in place.
pub fn normalize(tensor: &mut Array3<f32>, mean: [f32; 3], std: [f32; 3]) {
    for (mut plane, (m, s)) in tensor
        .axis_iter_mut(Axis(0))
        .zip(mean.into_iter().zip(std))
    {
        plane.mapv_inplace(|v| (v - m) / s);
    }
}

/// Crop the spatial center of a CHW tensor to exactly `bounds`.
///
/// Axes shorter than the target are zero-padded around the center first, so the
/// output shape is always `(C, bounds.height, bounds.width)`.
pub fn center_crop(tensor: Array3<f32>, bounds: Bounds) -> Array3<f32> {
    let (channels, height, width) = tensor.dim();
    let (out_height, out_width) = (bounds.height as usize, bounds.width as usize);
    if (height, width) == (out_height, out_width) {
        return tensor;
    }

    let rows = crop_span(height, out_height);
    let cols = crop_span(width, out_width);

    let mut out = Array3::<f32>::zeros((channels, out_height, out_width));
    out.slice_mut(s![.., rows.dst, cols.dst])
        .assign(&tensor.slice(s![.., rows.src, cols.src]));
    out
}

struct Span {
    src: Range<usize>,
    dst: Range<usize>,
}

fn crop_span(len: usize, target: usize) -> Span {
    if len >= target {
        let start = ((len - target) as f64 / 2.0).round_ties_even() as usize;
        Span {
            src: start..start + target,
            dst: 0..target,
        }
    } else {
        let start = (target - len) / 2;
        Span {
            src: 0..len,
            dst: start..start + len,
        }
    }
}
