//! Image preprocessing and mask postprocessing for segmentation models

use crate::{
    error::{BgRemovalError, Result},
    models::PreprocessingConfig,
    types::SegmentationMask,
};
use image::{imageops::FilterType, DynamicImage, ImageBuffer, Luma, RgbImage};
use ndarray::Array4;

/// Letterbox geometry shared by preprocessing and its inverse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    /// Scale factor applied to the original image
    pub scale: f32,
    /// X offset of the scaled image inside the square canvas
    pub offset_x: u32,
    /// Y offset of the scaled image inside the square canvas
    pub offset_y: u32,
    /// Scaled width
    pub scaled_width: u32,
    /// Scaled height
    pub scaled_height: u32,
}

impl LetterboxTransform {
    /// Fit `original` into a `target_size` square, preserving aspect ratio
    #[must_use]
    pub fn fit(original: (u32, u32), target_size: u32) -> Self {
        let target = target_size as f32;
        let (orig_width, orig_height) = (original.0.max(1) as f32, original.1.max(1) as f32);
        let scale = (target / orig_width).min(target / orig_height);

        let scaled_width = ((orig_width * scale).round() as u32).clamp(1, target_size);
        let scaled_height = ((orig_height * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            offset_x: (target_size - scaled_width) / 2,
            offset_y: (target_size - scaled_height) / 2,
            scaled_width,
            scaled_height,
        }
    }
}

/// Shared image preprocessing utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Padding colour used around the letterboxed image
    pub const PADDING_COLOR: [u8; 3] = [255, 255, 255];

    /// Convert an image into a normalized NCHW tensor for the model
    ///
    /// RGB conversion, aspect-preserving resize, centre padding to the
    /// model's square input, then per-channel normalization.
    ///
    /// # Errors
    /// - Zero-sized input image
    /// - Non-square or zero target size
    pub fn preprocess_for_inference(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
    ) -> Result<Array4<f32>> {
        let target_size = preprocessing_config.target_size[0];
        if target_size == 0 || target_size != preprocessing_config.target_size[1] {
            return Err(BgRemovalError::invalid_config(format!(
                "Model target size must be square and non-zero, got {:?}",
                preprocessing_config.target_size
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(BgRemovalError::decode("Image has zero width or height"));
        }

        let rgb_image = image.to_rgb8();
        let transform = LetterboxTransform::fit(rgb_image.dimensions(), target_size);

        let resized = image::imageops::resize(
            &rgb_image,
            transform.scaled_width,
            transform.scaled_height,
            FilterType::Triangle,
        );

        let padding = Self::PADDING_COLOR;
        let mut canvas: RgbImage =
            ImageBuffer::from_pixel(target_size, target_size, image::Rgb(padding));
        image::imageops::replace(
            &mut canvas,
            &resized,
            i64::from(transform.offset_x),
            i64::from(transform.offset_y),
        );

        Ok(Self::canvas_to_tensor(&canvas, preprocessing_config))
    }

    fn canvas_to_tensor(canvas: &RgbImage, preprocessing_config: &PreprocessingConfig) -> Array4<f32> {
        let (width, height) = canvas.dimensions();
        let mean = preprocessing_config.normalization_mean;
        let std = preprocessing_config.normalization_std;

        Array4::from_shape_fn((1, 3, height as usize, width as usize), |(_, c, y, x)| {
            let value = f32::from(canvas.get_pixel(x as u32, y as u32)[c]) / 255.0;
            (value - mean[c]) / std[c]
        })
    }

    /// Map a 1×1×H×W model output back onto the original image as a byte mask
    ///
    /// The letterboxed region is cropped out, min-max normalized and resized
    /// to the original dimensions with a Lanczos filter. A flat prediction
    /// has no range to stretch and is clamped to `[0, 1]` instead.
    ///
    /// # Errors
    /// - Tensor is not 1×1×H×W with a square spatial size
    pub fn tensor_to_mask(
        tensor: &Array4<f32>,
        original_dimensions: (u32, u32),
    ) -> Result<SegmentationMask> {
        let shape = tensor.shape();
        let (mask_height, mask_width) = match shape {
            [1, 1, h, w] if h == w && *h > 0 => (*h, *w),
            _ => {
                return Err(BgRemovalError::inference(format!(
                    "Invalid output tensor shape {shape:?}, expected [1, 1, N, N]"
                )))
            },
        };

        let (orig_width, orig_height) = original_dimensions;
        if orig_width == 0 || orig_height == 0 {
            return Ok(SegmentationMask::new(Vec::new(), original_dimensions));
        }

        let transform = LetterboxTransform::fit(original_dimensions, mask_width as u32);
        let crop_value = |x: u32, y: u32| {
            let tensor_x = (x + transform.offset_x) as usize;
            let tensor_y = (y + transform.offset_y) as usize;
            if tensor_x < mask_width && tensor_y < mask_height {
                tensor.get([0, 0, tensor_y, tensor_x]).copied().unwrap_or(0.0)
            } else {
                0.0
            }
        };

        let (mut min, mut max) = (f32::INFINITY, f32::NEG_INFINITY);
        for y in 0..transform.scaled_height {
            for x in 0..transform.scaled_width {
                let value = crop_value(x, y);
                min = min.min(value);
                max = max.max(value);
            }
        }
        let range = max - min;

        let cropped: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(transform.scaled_width, transform.scaled_height, |x, y| {
                let value = crop_value(x, y);
                let normalized = if range > f32::EPSILON {
                    (value - min) / range
                } else {
                    value
                };
                Luma([normalized.clamp(0.0, 1.0)])
            });

        let resized = image::imageops::resize(&cropped, orig_width, orig_height, FilterType::Lanczos3);
        let data = resized
            .pixels()
            .map(|p| (p[0].clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();

        Ok(SegmentationMask::new(data, original_dimensions))
    }
}
