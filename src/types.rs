//! Core types for background removal operations

use crate::{
    config::OutputFormat,
    error::{BgRemovalError, Result},
};
use image::RgbaImage;
use std::path::PathBuf;

/// Per-pixel foreground alpha produced by a segmentation model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0 = background, 255 = foreground), row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Composite the mask into the alpha channel of `image`
    ///
    /// Background pixels (mask 0) become fully transparent black; all other
    /// pixels keep their colour with alpha set to the mask value.
    pub fn apply_to_image(&self, image: &mut RgbaImage) -> Result<()> {
        if image.dimensions() != self.dimensions {
            return Err(BgRemovalError::inference(format!(
                "Image {:?} and mask {:?} dimensions do not match",
                image.dimensions(),
                self.dimensions
            )));
        }

        for (pixel, &alpha) in image.pixels_mut().zip(&self.data) {
            if alpha == 0 {
                *pixel = image::Rgba([0, 0, 0, 0]);
            } else {
                pixel[3] = alpha;
            }
        }

        Ok(())
    }
}

/// Summary of a completed processing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Image dimensions (width, height)
    pub dimensions: (u32, u32),
    pub output_format: OutputFormat,
    /// Pixels with alpha 0 after removal
    pub transparent_pixels: u64,
    /// Whether the written file kept the alpha channel
    pub alpha_preserved: bool,
    /// Name of the remover that produced the result
    pub remover: String,
}

impl ProcessingOutcome {
    /// Fraction of pixels made fully transparent, in `[0, 1]`
    #[must_use]
    pub fn transparent_ratio(&self) -> f64 {
        let total = u64::from(self.dimensions.0) * u64::from(self.dimensions.1);
        if total == 0 {
            return 0.0;
        }
        self.transparent_pixels as f64 / total as f64
    }
}

/// Count pixels whose alpha is zero
#[must_use]
pub fn count_transparent(image: &RgbaImage) -> u64 {
    image.pixels().filter(|p| p[3] == 0).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_mask() {
        let mut image = RgbaImage::from_pixel(2, 1, image::Rgba([200, 100, 50, 255]));
        let mask = SegmentationMask::new(vec![0, 128], (2, 1));
        mask.apply_to_image(&mut image).unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [200, 100, 50, 128]);
        assert_eq!(count_transparent(&image), 1);
    }

    #[test]
    fn test_apply_mask_dimension_mismatch() {
        let mut image = RgbaImage::new(3, 3);
        let mask = SegmentationMask::new(vec![255; 4], (2, 2));
        assert!(mask.apply_to_image(&mut image).is_err());
    }

    #[test]
    fn test_transparent_ratio() {
        let outcome = ProcessingOutcome {
            input_path: PathBuf::from("in.png"),
            output_path: PathBuf::from("out.png"),
            dimensions: (10, 10),
            output_format: OutputFormat::Png,
            transparent_pixels: 25,
            alpha_preserved: true,
            remover: "flood-fill".to_string(),
        };
        assert!((outcome.transparent_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
