use std::path::Path;

use crate::shared::frame::Frame;

/// Decodes a single image file into a frame.
///
/// Any error is reported to the batch as a read failure for that file.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
