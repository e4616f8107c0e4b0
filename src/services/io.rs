//! Image file input/output

use crate::{
    config::OutputFormat,
    error::{BgRemovalError, Result},
    services::OutputFormatHandler,
};
use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Loading and atomic saving of image files
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Extension-based decoding is tried first, then content sniffing, so a
    /// mislabelled file still loads.
    ///
    /// # Errors
    /// - `NotFound` if the path does not exist
    /// - `Decode` if neither extension nor content identify a decodable image
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgRemovalError::not_found(path_ref));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(extension_err) => {
                tracing::debug!(
                    path = %path_ref.display(),
                    error = %extension_err,
                    "Extension-based decoding failed, trying content detection"
                );

                let data = std::fs::read(path_ref).map_err(|e| {
                    BgRemovalError::decode(format!("Failed to read {}: {e}", path_ref.display()))
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    BgRemovalError::decode(format!(
                        "{} is not a readable image ({} bytes): {content_err}",
                        path_ref.display(),
                        data.len()
                    ))
                })
            },
        }
    }

    /// Save an image, replacing any existing file
    ///
    /// Parent directories are created. The image is encoded into a temporary
    /// file beside the target and renamed over it, so a failed encode never
    /// leaves a partial file behind.
    ///
    /// # Errors
    /// - `Encode` if the encoder rejects the image
    /// - `Io` if the directory, temporary file or rename fails
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path_ref = path.as_ref();
        let parent = match path_ref.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        std::fs::create_dir_all(parent)
            .map_err(|e| BgRemovalError::file_io_error("create output directory", parent, &e))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| BgRemovalError::file_io_error("create temporary file in", parent, &e))?;

        {
            let mut writer = BufWriter::new(temp_file.as_file_mut());
            image
                .write_to(&mut writer, OutputFormatHandler::image_format(format))
                .map_err(|e| {
                    BgRemovalError::encode(format!(
                        "Failed to save {} as {format}: {e}",
                        path_ref.display()
                    ))
                })?;
            writer
                .flush()
                .map_err(|e| BgRemovalError::file_io_error("write", path_ref, &e))?;
        }

        temp_file
            .persist(path_ref)
            .map_err(|e| BgRemovalError::file_io_error("replace", path_ref, &e.error))?;

        tracing::debug!(path = %path_ref.display(), format = %format, "Image saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbaImage};
    use tempfile::TempDir;

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(4, 3, |x, _| {
            image::Rgba([x as u8 * 60, 0, 0, if x == 0 { 0 } else { 255 }])
        }))
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = ImageIOService::load_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, BgRemovalError::NotFound { .. }));
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, "this is not an image").unwrap();

        let err = ImageIOService::load_image(&path).unwrap_err();
        assert!(matches!(err, BgRemovalError::Decode(_)));
    }

    #[test]
    fn test_load_falls_back_to_content_detection() {
        let dir = TempDir::new().unwrap();
        let real_png = dir.path().join("real.png");
        sample_image().save(&real_png).unwrap();
        let mislabelled = dir.path().join("photo.jpg");
        std::fs::rename(&real_png, &mislabelled).unwrap();

        let image = ImageIOService::load_image(&mislabelled).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
    }

    #[test]
    fn test_save_creates_directories_and_roundtrips_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.png");

        ImageIOService::save_image(&sample_image(), &path, OutputFormat::Png).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(0, 0)[3], 0);
        assert_eq!(loaded.get_pixel(1, 0).0, [60, 0, 0, 255]);
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        std::fs::write(&path, b"stale").unwrap();

        ImageIOService::save_image(&sample_image(), &path, OutputFormat::Png).unwrap();

        assert!(image::open(&path).is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_encode_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jpg");

        // The JPEG encoder rejects RGBA input
        let result = ImageIOService::save_image(&sample_image(), &path, OutputFormat::Jpeg);

        assert!(matches!(result, Err(BgRemovalError::Encode(_))));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
