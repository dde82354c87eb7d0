use image::imageops::FilterType;

use crate::cropping::domain::crop_resizer::CropResizer;
use crate::imaging::infrastructure::frame_conversion::{dynamic_to_frame, frame_to_dynamic};
use crate::shared::frame::Frame;
use crate::shared::geometry::CropRegion;

/// Crops by row copy and resamples with Lanczos3 when the crop is off-size.
pub struct LanczosCropResizer;

impl LanczosCropResizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LanczosCropResizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CropResizer for LanczosCropResizer {
    fn extract_and_normalize(
        &self,
        frame: &Frame,
        region: &CropRegion,
        target_size: u32,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        if target_size == 0 {
            return Err("Target size must be positive".into());
        }
        if region.is_empty() || !region.fits_within(frame.dimensions()) {
            return Err(format!(
                "Crop region {region:?} is empty or outside {}x{} image",
                frame.width(),
                frame.height()
            )
            .into());
        }

        let cropped = extract(frame, region);
        if cropped.width() == target_size && cropped.height() == target_size {
            return Ok(cropped);
        }

        log::debug!(
            "Resampling {}x{} crop to {target_size}x{target_size}",
            cropped.width(),
            cropped.height()
        );
        let resized = frame_to_dynamic(cropped)?.resize_exact(
            target_size,
            target_size,
            FilterType::Lanczos3,
        );
        Ok(dynamic_to_frame(resized))
    }
}

/// Copies the rows of `region` out of `frame`. The region must be in bounds.
fn extract(frame: &Frame, region: &CropRegion) -> Frame {
    let channels = frame.channels() as usize;
    let stride = frame.width() as usize * channels;
    let width = region.width() as usize;
    let height = region.height() as usize;
    let row_start = region.left as usize * channels;
    let row_len = width * channels;

    let mut data = Vec::with_capacity(row_len * height);
    for row in region.top as usize..region.bottom as usize {
        let start = row * stride + row_start;
        data.extend_from_slice(&frame.data()[start..start + row_len]);
    }
    Frame::new(data, width as u32, height as u32, frame.channels())
}
