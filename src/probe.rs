//! Pixel probe for checking a written image
//!
//! Samples RGBA values on a regular grid in the top-left corner, where a
//! removed background should read as alpha 0.

use crate::{error::Result, services::ImageIOService};
use image::{GenericImageView, Pixel};
use std::fmt;
use std::path::Path;

/// Side of the sampled top-left square
pub const DEFAULT_REGION: u32 = 20;
/// Distance between samples
pub const DEFAULT_STEP: u32 = 5;

/// One sampled pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub x: u32,
    pub y: u32,
    pub rgba: [u8; 4],
}

impl fmt::Display for PixelSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.rgba;
        write!(f, "({},{}): {r},{g},{b} A={a}", self.x, self.y)
    }
}

/// Sample the `region`×`region` top-left square of the image at `path` every `step` pixels
///
/// Samples are row-major and clipped to the image bounds. A `step` of 0 is
/// treated as 1.
///
/// # Errors
/// - `NotFound` or `Decode` from loading the image
pub fn probe<P: AsRef<Path>>(path: P, region: u32, step: u32) -> Result<Vec<PixelSample>> {
    let image = ImageIOService::load_image(path)?;
    let step = step.max(1) as usize;
    let max_x = region.min(image.width());
    let max_y = region.min(image.height());

    let samples = (0..max_y)
        .step_by(step)
        .flat_map(|y| (0..max_x).step_by(step).map(move |x| (x, y)))
        .map(|(x, y)| PixelSample {
            x,
            y,
            rgba: image.get_pixel(x, y).to_rgba().0,
        })
        .collect();

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_probe_grid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("probe.png");
        RgbaImage::from_fn(30, 30, |x, y| Rgba([x as u8, y as u8, 7, if x < 10 { 0 } else { 255 }]))
            .save(&path)
            .unwrap();

        let samples = probe(&path, DEFAULT_REGION, DEFAULT_STEP).unwrap();
        assert_eq!(samples.len(), 16);
        assert_eq!(samples[0].to_string(), "(0,0): 0,0,7 A=0");
        assert_eq!(samples[6].to_string(), "(10,5): 10,5,7 A=255");
        assert_eq!(samples[15].rgba, [15, 15, 7, 255]);
    }

    #[test]
    fn test_probe_clips_to_small_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.png");
        RgbaImage::from_pixel(7, 3, Rgba([1, 2, 3, 4])).save(&path).unwrap();

        let samples = probe(&path, DEFAULT_REGION, DEFAULT_STEP).unwrap();
        let coords: Vec<(u32, u32)> = samples.iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(coords, vec![(0, 0), (5, 0)]);
    }

    #[test]
    fn test_probe_missing_file() {
        assert!(probe("/no/such/image.png", DEFAULT_REGION, DEFAULT_STEP).is_err());
    }
}
