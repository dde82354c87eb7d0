use thiserror::Error;

use crate::shared::constants::{OUTPUT_PREFIX, TARGET_ANCHOR_X, TARGET_ANCHOR_Y, TARGET_SIZE};
use crate::shared::geometry::AnchorPoint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropSettingsError {
    #[error("target size must be positive")]
    ZeroSize,
    #[error("target anchor ({x}, {y}) lies outside the {size}x{size} canvas")]
    AnchorOutsideCanvas { x: i32, y: i32, size: u32 },
    #[error("output prefix must not contain path separators: {0:?}")]
    InvalidPrefix(String),
}

/// Output canvas geometry and naming shared by every item in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropSettings {
    pub target_size: u32,
    pub target_anchor: AnchorPoint,
    pub output_prefix: String,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            target_size: TARGET_SIZE,
            target_anchor: AnchorPoint::new(TARGET_ANCHOR_X, TARGET_ANCHOR_Y),
            output_prefix: OUTPUT_PREFIX.to_string(),
        }
    }
}

impl CropSettings {
    pub fn validate(&self) -> Result<(), CropSettingsError> {
        if self.target_size == 0 {
            return Err(CropSettingsError::ZeroSize);
        }
        let size = self.target_size as i64;
        let AnchorPoint { x, y } = self.target_anchor;
        if x < 0 || y < 0 || x as i64 >= size || y as i64 >= size {
            return Err(CropSettingsError::AnchorOutsideCanvas {
                x,
                y,
                size: self.target_size,
            });
        }
        if self.output_prefix.contains(['/', '\\']) {
            return Err(CropSettingsError::InvalidPrefix(self.output_prefix.clone()));
        }
        Ok(())
    }

    /// Output file name for an input file name, e.g. `a.jpg` → `processed_a.jpg`.
    pub fn output_name(&self, input_name: &str) -> String {
        format!("{}{}", self.output_prefix, input_name)
    }
}
