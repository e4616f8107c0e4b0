//! Corner-seeded flood fill keyer
//!
//! Clears pixels connected to the image corners that look like a white
//! backdrop or the light grey of a baked-in transparency checkerboard.

use super::BackgroundRemover;
use crate::{config::FloodFillConfig, error::Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::VecDeque;

/// Grey used by common checkerboard transparency previews
const CHECKERBOARD_GREY: [u8; 3] = [241, 243, 244];

/// Model-free remover for icons and product shots on flat backdrops
#[derive(Debug, Clone, Default)]
pub struct FloodFillRemover {
    config: FloodFillConfig,
}

impl FloodFillRemover {
    #[must_use]
    pub fn new(config: FloodFillConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FloodFillConfig {
        &self.config
    }

    /// Whether a pixel counts as background for the fill
    #[must_use]
    pub fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, _] = pixel.0;
        let white_floor = 255 - self.config.white_tolerance;
        let is_white = r >= white_floor && g >= white_floor && b >= white_floor;

        let tolerance = self.config.grey_tolerance;
        let is_grey = [r, g, b]
            .iter()
            .zip(CHECKERBOARD_GREY)
            .all(|(&channel, grey)| channel.abs_diff(grey) < tolerance);

        is_white || is_grey
    }

    /// Clear the background of `image` in place, returning the number of cleared pixels
    pub fn apply(&self, image: &mut RgbaImage) -> u64 {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return 0;
        }

        let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
        let mut visited = vec![false; width as usize * height as usize];
        let mut queue = VecDeque::new();

        // Corners are cleared whatever their colour
        for (x, y) in [(0, 0), (width - 1, 0), (0, height - 1), (width - 1, height - 1)] {
            let i = index(x, y);
            if !visited[i] {
                visited[i] = true;
                queue.push_back((x, y));
            }
        }

        let mut cleared = 0;
        while let Some((x, y)) = queue.pop_front() {
            image.get_pixel_mut(x, y)[3] = 0;
            cleared += 1;

            let neighbours = [
                (x.checked_add(1), Some(y)),
                (x.checked_sub(1), Some(y)),
                (Some(x), y.checked_add(1)),
                (Some(x), y.checked_sub(1)),
            ];
            for (nx, ny) in neighbours {
                let (Some(nx), Some(ny)) = (nx, ny) else {
                    continue;
                };
                if nx >= width || ny >= height {
                    continue;
                }
                let i = index(nx, ny);
                if !visited[i] && self.is_background(image.get_pixel(nx, ny)) {
                    visited[i] = true;
                    queue.push_back((nx, ny));
                }
            }
        }

        cleared
    }
}

impl BackgroundRemover for FloodFillRemover {
    fn name(&self) -> String {
        "flood-fill".to_string()
    }

    fn remove(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        let mut rgba = image.to_rgba8();
        let cleared = self.apply(&mut rgba);
        tracing::debug!(
            cleared,
            white_tolerance = self.config.white_tolerance,
            grey_tolerance = self.config.grey_tolerance,
            "Flood fill complete"
        );
        Ok(rgba)
    }
}
