use crate::shared::frame::Frame;
use crate::shared::geometry::CropRegion;

/// Domain interface for cutting a region out of a frame and bringing it to
/// the square output size.
pub trait CropResizer: Send {
    /// Returns a `target_size` × `target_size` frame with the input's channel
    /// count. Regions already at the target size pass through unresampled.
    fn extract_and_normalize(
        &self,
        frame: &Frame,
        region: &CropRegion,
        target_size: u32,
    ) -> Result<Frame, Box<dyn std::error::Error>>;
}
