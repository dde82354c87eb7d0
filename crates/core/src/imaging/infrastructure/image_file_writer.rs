use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::frame_conversion::frame_to_dynamic;
use crate::shared::frame::Frame;

/// Writes frames with the `image` crate, encoding by file extension.
///
/// Alpha is dropped for JPEG, which cannot store it. Gray+alpha is widened
/// to RGBA for TIFF, whose encoder has no `La8` support.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let format = ImageFormat::from_path(path)?;
        let image = frame_to_dynamic(frame.clone())?;
        let image = match (format, image) {
            (ImageFormat::Jpeg, DynamicImage::ImageRgba8(rgba)) => {
                DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).into_rgb8())
            }
            (ImageFormat::Jpeg, DynamicImage::ImageLumaA8(la)) => {
                DynamicImage::ImageLuma8(DynamicImage::ImageLumaA8(la).into_luma8())
            }
            (ImageFormat::Tiff, DynamicImage::ImageLumaA8(la)) => {
                DynamicImage::ImageRgba8(DynamicImage::ImageLumaA8(la).into_rgba8())
            }
            (_, image) => image,
        };

        image.save_with_format(path, format)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn make_frame(width: u32, height: u32, pixel: &[u8]) -> Frame {
        let data = pixel.repeat((width * height) as usize);
        Frame::new(data, width, height, pixel.len() as u8)
    }

    #[test]
    fn test_write_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        ImageFileWriter::new()
            .write(&path, &make_frame(10, 8, &[50, 100, 200]))
            .unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &make_frame(5, 5, &[50, 100, 200, 128]))
            .unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgba8);
        assert_eq!(img.to_rgba8().get_pixel(0, 0).0, [50, 100, 200, 128]);
    }

    #[test]
    fn test_rgba_to_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.JPG");
        ImageFileWriter::new()
            .write(&path, &make_frame(16, 16, &[10, 20, 30, 255]))
            .unwrap();
        assert_eq!(image::open(&path).unwrap().color(), image::ColorType::Rgb8);
    }

    #[rstest]
    fn test_every_layout_encodes_to_every_extension(
        #[values(1, 2, 3, 4)] channels: u8,
        #[values("png", "jpg", "bmp", "tif", "webp")] ext: &str,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("out.{ext}"));
        let pixel = [90, 140, 200, 255];

        ImageFileWriter::new()
            .write(&path, &make_frame(12, 9, &pixel[..channels as usize]))
            .unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (12, 9));
    }

    #[test]
    fn test_gray_alpha_tiff_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tif");
        ImageFileWriter::new()
            .write(&path, &make_frame(6, 6, &[80, 128]))
            .unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgba8);
        assert_eq!(img.to_rgba8().get_pixel(2, 3).0, [80, 80, 80, 128]);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let writer = ImageFileWriter::new();
        writer.write(&path, &make_frame(4, 4, &[0, 0, 0])).unwrap();
        writer.write(&path, &make_frame(6, 6, &[0, 0, 0])).unwrap();
        assert_eq!(image::open(&path).unwrap().width(), 6);
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        assert!(ImageFileWriter::new()
            .write(&path, &make_frame(4, 4, &[0, 0, 0]))
            .is_err());
    }
}
