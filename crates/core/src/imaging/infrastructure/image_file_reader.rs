use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::infrastructure::frame_conversion::dynamic_to_frame;
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate, sniffing the format from the
/// file contents rather than trusting the extension.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Ok(dynamic_to_frame(image))
    }
}
