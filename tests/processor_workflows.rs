//! Library-level workflow tests for `BackgroundRemovalProcessor`

use bgstrip::{
    remove_background_file, BackgroundRemovalProcessor, BackgroundRemover, BgRemovalError,
    ErrorKind, ModelPreset, ModelSpec, OutputFormat, RemovalConfig, RemovalMethod,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Remover that clears the left half of every image
struct LeftHalfRemover;

impl BackgroundRemover for LeftHalfRemover {
    fn name(&self) -> String {
        "left-half".to_string()
    }

    fn remove(&mut self, image: &DynamicImage) -> bgstrip::Result<RgbaImage> {
        let mut rgba = image.to_rgba8();
        let half = rgba.width() / 2;
        for (x, _, pixel) in rgba.enumerate_pixels_mut() {
            if x < half {
                *pixel = Rgba([0, 0, 0, 0]);
            }
        }
        Ok(rgba)
    }
}

/// Remover that returns an image of the wrong size
struct ShrinkingRemover;

impl BackgroundRemover for ShrinkingRemover {
    fn name(&self) -> String {
        "shrinking".to_string()
    }

    fn remove(&mut self, _image: &DynamicImage) -> bgstrip::Result<RgbaImage> {
        Ok(RgbaImage::new(1, 1))
    }
}

fn write_checkerboard_backdrop(dir: &Path) -> PathBuf {
    let path = dir.join("checker.png");
    RgbaImage::from_fn(40, 40, |x, y| {
        if (15..25).contains(&x) && (15..25).contains(&y) {
            Rgba([30, 90, 30, 255])
        } else if (x / 4 + y / 4) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([241, 243, 244, 255])
        }
    })
    .save(&path)
    .unwrap();
    path
}

#[test]
fn test_custom_remover_drives_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_checkerboard_backdrop(temp_dir.path());
    let output = temp_dir.path().join("half.webp");

    let mut processor =
        BackgroundRemovalProcessor::with_remover(RemovalConfig::default(), Box::new(LeftHalfRemover));
    let outcome = processor.process(&input, &output).unwrap();

    assert_eq!(outcome.remover, "left-half");
    assert_eq!(outcome.output_format, OutputFormat::WebP);
    assert_eq!(outcome.transparent_pixels, 20 * 40);
    assert!((outcome.transparent_ratio() - 0.5).abs() < f64::EPSILON);

    let written = image::open(&output).unwrap().to_rgba8();
    assert_eq!(written.get_pixel(5, 5)[3], 0);
    assert_eq!(written.get_pixel(35, 5)[3], 255);
}

#[test]
fn test_wrong_size_result_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_checkerboard_backdrop(temp_dir.path());
    let output = temp_dir.path().join("out.png");

    let mut processor =
        BackgroundRemovalProcessor::with_remover(RemovalConfig::default(), Box::new(ShrinkingRemover));
    let err = processor.process(&input, &output).unwrap_err();

    assert!(matches!(err, BgRemovalError::Inference(_)));
    assert!(!output.exists());
}

#[test]
fn test_flood_fill_clears_checkerboard_backdrop() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_checkerboard_backdrop(temp_dir.path());
    let output = temp_dir.path().join("clear.tiff");
    let config = RemovalConfig::builder()
        .method(RemovalMethod::FloodFill)
        .build()
        .unwrap();

    let outcome = remove_background_file(&input, &output, &config).unwrap();

    assert_eq!(outcome.transparent_pixels, 40 * 40 - 10 * 10);
    assert!(outcome.alpha_preserved);
    let written = image::open(&output).unwrap().to_rgba8();
    assert_eq!(written.get_pixel(20, 20).0, [30, 90, 30, 255]);
    assert_eq!(written.get_pixel(4, 0)[3], 0);
}

#[test]
fn test_error_kinds_for_each_stage() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_checkerboard_backdrop(temp_dir.path());
    let flood_fill = RemovalConfig::builder()
        .method(RemovalMethod::FloodFill)
        .build()
        .unwrap();

    let missing = remove_background_file(temp_dir.path().join("nope.png"), temp_dir.path().join("a.png"), &flood_fill)
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let text = temp_dir.path().join("text.png");
    std::fs::write(&text, "not an image").unwrap();
    let decode = remove_background_file(&text, temp_dir.path().join("b.png"), &flood_fill).unwrap_err();
    assert_eq!(decode.kind(), ErrorKind::DecodeError);

    let model_config = RemovalConfig::builder()
        .model_spec(ModelSpec::new(temp_dir.path().join("none.onnx"), ModelPreset::Isnet))
        .build()
        .unwrap();
    let model = remove_background_file(&input, temp_dir.path().join("c.png"), &model_config).unwrap_err();
    assert_eq!(model.kind(), ErrorKind::ModelError);

    let encode = remove_background_file(&input, temp_dir.path().join("d.gif"), &flood_fill).unwrap_err();
    assert_eq!(encode.kind(), ErrorKind::EncodeError);
}

#[test]
fn test_processor_reuses_remover_across_files() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_checkerboard_backdrop(temp_dir.path());
    let config = RemovalConfig::builder()
        .method(RemovalMethod::FloodFill)
        .build()
        .unwrap();
    let mut processor = BackgroundRemovalProcessor::new(config).unwrap();

    assert!(!processor.is_initialized());
    let first = processor.process(&input, temp_dir.path().join("one.png")).unwrap();
    assert!(processor.is_initialized());
    let second = processor.process(&input, temp_dir.path().join("two.bmp")).unwrap();

    assert_eq!(first.transparent_pixels, second.transparent_pixels);
    assert!(!second.alpha_preserved);
}
