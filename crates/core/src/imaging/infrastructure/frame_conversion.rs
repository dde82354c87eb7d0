use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameConversionError {
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u8),
    #[error("pixel buffer does not match {width}x{height}x{channels}")]
    BufferMismatch { width: u32, height: u32, channels: u8 },
}

/// Wraps a frame's bytes in the `image` buffer type matching its channel count.
pub fn frame_to_dynamic(frame: Frame) -> Result<DynamicImage, FrameConversionError> {
    let (width, height, channels) = (frame.width(), frame.height(), frame.channels());
    let data = frame.into_data();
    let image = match channels {
        1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        other => return Err(FrameConversionError::UnsupportedChannels(other)),
    };
    image.ok_or(FrameConversionError::BufferMismatch {
        width,
        height,
        channels,
    })
}

/// Converts a decoded image to an 8-bit frame with the same channel layout.
///
/// 16-bit and float images are narrowed to 8 bits; gray stays gray and alpha
/// is kept.
pub fn dynamic_to_frame(image: DynamicImage) -> Frame {
    let (width, height) = (image.width(), image.height());
    let color = image.color();
    let (data, channels) = match (color.has_color(), color.has_alpha()) {
        (false, false) => (image.into_luma8().into_raw(), 1),
        (false, true) => (image.into_luma_alpha8().into_raw(), 2),
        (true, false) => (image.into_rgb8().into_raw(), 3),
        (true, true) => (image.into_rgba8().into_raw(), 4),
    };
    Frame::new(data, width, height, channels)
}
