//! Image preprocessing for keypoint detection.
//!
//! Detectors consume a square model input. Frames are resized with a
//! preserved aspect ratio and centered on a padded square canvas
//! (letterboxing); detector outputs are mapped back through
//! [`LetterboxInfo`] so downstream components only ever see coordinates
//! normalized to the original image's unit square.

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbImage;
use ndarray::Array4;

use crate::error::{PoseError, Result};

/// Letterbox padding color. MoveNet-style models are trained with black
/// padding (`tf.image.resize_with_pad` semantics).
pub const LETTERBOX_COLOR: [u8; 3] = [0, 0, 0];

/// Geometry of a letterbox transform, used to map detector output
/// coordinates back to the original image's unit square.
#[derive(Debug, Clone, Copy)]
pub struct LetterboxInfo {
    /// Uniform scale applied to the original image.
    pub scale: f32,
    /// Horizontal padding on the left, in model-input pixels.
    pub pad_x: u32,
    /// Vertical padding on the top, in model-input pixels.
    pub pad_y: u32,
    /// Square model input side length.
    pub target: u32,
    /// Original image width.
    pub orig_width: u32,
    /// Original image height.
    pub orig_height: u32,
}

impl LetterboxInfo {
    /// Map a coordinate normalized to the letterboxed square back to the
    /// original image's unit square, clamped to [0, 1].
    #[must_use]
    pub fn unletterbox(&self, x: f32, y: f32) -> (f32, f32) {
        let px = x * self.target as f32 - self.pad_x as f32;
        let py = y * self.target as f32 - self.pad_y as f32;
        let ox = px / (self.orig_width as f32 * self.scale);
        let oy = py / (self.orig_height as f32 * self.scale);
        (ox.clamp(0.0, 1.0), oy.clamp(0.0, 1.0))
    }
}

/// Decode raw image bytes (any format the `image` crate supports) into RGB.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| PoseError::Image(format!("Failed to decode image: {e}")))?;
    Ok(img.to_rgb8())
}

/// Resize an image onto a square letterboxed canvas of side `target`.
///
/// Returns the canvas in row-major RGB bytes plus the transform geometry.
pub fn letterbox(image: &RgbImage, target: u32) -> Result<(Vec<u8>, LetterboxInfo)> {
    let (orig_width, orig_height) = image.dimensions();
    if orig_width == 0 || orig_height == 0 {
        return Err(PoseError::Image("Empty image".to_string()));
    }

    let scale = (target as f32 / orig_width as f32).min(target as f32 / orig_height as f32);
    let new_width = ((orig_width as f32 * scale) as u32).max(1);
    let new_height = ((orig_height as f32 * scale) as u32).max(1);
    let pad_x = (target - new_width) / 2;
    let pad_y = (target - new_height) / 2;

    let src = Image::from_vec_u8(
        orig_width,
        orig_height,
        image.as_raw().clone(),
        PixelType::U8x3,
    )
    .map_err(|e| PoseError::Image(format!("Failed to wrap image buffer: {e}")))?;

    let mut resized = Image::new(new_width, new_height, PixelType::U8x3);
    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )
        .map_err(|e| PoseError::Image(format!("Failed to resize image: {e}")))?;

    // Paste the resized image into the center of the padded canvas.
    let target_usize = target as usize;
    let mut canvas = vec![0u8; target_usize * target_usize * 3];
    if LETTERBOX_COLOR != [0, 0, 0] {
        for pixel in canvas.chunks_exact_mut(3) {
            pixel.copy_from_slice(&LETTERBOX_COLOR);
        }
    }

    let resized_bytes = resized.buffer();
    let row_bytes = new_width as usize * 3;
    for row in 0..new_height as usize {
        let dst_start = ((row + pad_y as usize) * target_usize + pad_x as usize) * 3;
        let src_start = row * row_bytes;
        canvas[dst_start..dst_start + row_bytes]
            .copy_from_slice(&resized_bytes[src_start..src_start + row_bytes]);
    }

    Ok((
        canvas,
        LetterboxInfo {
            scale,
            pad_x,
            pad_y,
            target,
            orig_width,
            orig_height,
        },
    ))
}

/// Convert a letterboxed RGB canvas into a `[1, S, S, 3]` f32 tensor with
/// raw 0-255 channel values, the input layout MoveNet-style graphs expect.
#[must_use]
pub fn canvas_to_tensor(canvas: &[u8], target: u32) -> Array4<f32> {
    let side = target as usize;
    let mut tensor = Array4::<f32>::zeros((1, side, side, 3));
    for y in 0..side {
        for x in 0..side {
            let offset = (y * side + x) * 3;
            tensor[[0, y, x, 0]] = f32::from(canvas[offset]);
            tensor[[0, y, x, 1]] = f32::from(canvas[offset + 1]);
            tensor[[0, y, x, 2]] = f32::from(canvas[offset + 2]);
        }
    }
    tensor
}
