//! Background removers
//!
//! A remover turns a decoded image into an RGBA image of the same size whose
//! alpha channel marks the background as transparent.

pub mod flood_fill;
pub mod segmentation;

pub use flood_fill::FloodFillRemover;
pub use segmentation::SegmentationRemover;

use crate::error::Result;
use image::{DynamicImage, RgbaImage};

/// Removes the background from a single image
pub trait BackgroundRemover {
    /// Short name used in logs and in `ProcessingOutcome::remover`
    fn name(&self) -> String;

    /// Produce an RGBA copy of `image` with the background made transparent
    ///
    /// The result always has the same dimensions as `image`.
    ///
    /// # Errors
    /// - Model loading or inference failures
    fn remove(&mut self, image: &DynamicImage) -> Result<RgbaImage>;
}
