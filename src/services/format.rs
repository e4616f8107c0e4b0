//! Output format selection and conversion

use crate::{
    config::OutputFormat,
    error::{BgRemovalError, Result},
};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

/// Maps output paths to formats and prepares images for encoding
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Pick the output format from a path's extension (case-insensitive)
    ///
    /// ```rust
    /// use bgstrip::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert_eq!(OutputFormatHandler::from_path("out/cat.JPG").unwrap(), OutputFormat::Jpeg);
    /// assert!(OutputFormatHandler::from_path("out/cat.gif").is_err());
    /// ```
    ///
    /// # Errors
    /// - Missing or unsupported extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<OutputFormat> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                BgRemovalError::encode(format!(
                    "Output path {} has no file extension; use .png, .webp, .tiff, .jpg or .bmp",
                    path.display()
                ))
            })?;

        match extension.as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            "bmp" => Ok(OutputFormat::Bmp),
            other => Err(BgRemovalError::encode(format!(
                "Unsupported output format '.{other}' for {}",
                path.display()
            ))),
        }
    }

    /// Encoder format for `format`
    #[must_use]
    pub fn image_format(format: OutputFormat) -> ImageFormat {
        match format {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }

    /// Whether the format keeps the alpha channel
    ///
    /// ```rust
    /// use bgstrip::{services::OutputFormatHandler, OutputFormat};
    ///
    /// assert!(OutputFormatHandler::supports_transparency(OutputFormat::Png));
    /// assert!(!OutputFormatHandler::supports_transparency(OutputFormat::Jpeg));
    /// ```
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png | OutputFormat::WebP | OutputFormat::Tiff => true,
            OutputFormat::Jpeg | OutputFormat::Bmp => false,
        }
    }

    /// Check a format before any work is done
    ///
    /// Formats without alpha are accepted with a warning unless `require_alpha` is set.
    ///
    /// # Errors
    /// - `require_alpha` is set and the format cannot store alpha
    pub fn validate_for_background_removal(format: OutputFormat, require_alpha: bool) -> Result<()> {
        if Self::supports_transparency(format) {
            return Ok(());
        }
        if require_alpha {
            return Err(BgRemovalError::encode(format!(
                "{format} cannot store transparency; choose .png, .webp or .tiff"
            )));
        }
        tracing::warn!(
            format = %format,
            "Output format does not support transparency, the background will be flattened"
        );
        Ok(())
    }

    /// Convert the RGBA removal result into what the encoder for `format` accepts
    ///
    /// Formats without alpha drop the channel.
    #[must_use]
    pub fn convert_format(rgba_image: RgbaImage, format: OutputFormat) -> DynamicImage {
        let image = DynamicImage::ImageRgba8(rgba_image);
        if Self::supports_transparency(format) {
            image
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_extensions() {
        let cases = [
            ("a.png", OutputFormat::Png),
            ("a.PNG", OutputFormat::Png),
            ("a.jpg", OutputFormat::Jpeg),
            ("a.jpeg", OutputFormat::Jpeg),
            ("a.webp", OutputFormat::WebP),
            ("a.tif", OutputFormat::Tiff),
            ("a.tiff", OutputFormat::Tiff),
            ("dir/a.bmp", OutputFormat::Bmp),
        ];
        for (path, expected) in cases {
            assert_eq!(OutputFormatHandler::from_path(path).unwrap(), expected, "{path}");
        }
    }

    #[test]
    fn test_from_path_rejects_unknown() {
        for path in ["a.gif", "a", "a.png.txt"] {
            let err = OutputFormatHandler::from_path(path).unwrap_err();
            assert!(matches!(err, BgRemovalError::Encode(_)), "{path}");
        }
    }

    #[test]
    fn test_validate_require_alpha() {
        assert!(OutputFormatHandler::validate_for_background_removal(OutputFormat::Jpeg, false).is_ok());
        assert!(OutputFormatHandler::validate_for_background_removal(OutputFormat::Jpeg, true).is_err());
        assert!(OutputFormatHandler::validate_for_background_removal(OutputFormat::Png, true).is_ok());
    }

    #[test]
    fn test_convert_format_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 0]));
        let png = OutputFormatHandler::convert_format(rgba.clone(), OutputFormat::Png);
        assert!(png.color().has_alpha());

        let jpeg = OutputFormatHandler::convert_format(rgba, OutputFormat::Jpeg);
        assert!(!jpeg.color().has_alpha());
        assert_eq!(jpeg.to_rgb8().get_pixel(0, 0).0, [10, 20, 30]);
    }
}
