use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use facecenter_core::detection::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use facecenter_core::shared::constants::{
    OUTPUT_PREFIX, TARGET_ANCHOR_X, TARGET_ANCHOR_Y, TARGET_SIZE,
};
use facecenter_core::shared::crop_settings::CropSettings;
use facecenter_core::shared::geometry::AnchorPoint;

/// Persisted defaults; any field missing from the file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_size: u32,
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub confidence: f64,
    pub output_prefix: String,
    pub pipelined: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_size: TARGET_SIZE,
            anchor_x: TARGET_ANCHOR_X,
            anchor_y: TARGET_ANCHOR_Y,
            confidence: DEFAULT_CONFIDENCE,
            output_prefix: OUTPUT_PREFIX.to_string(),
            pipelined: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCenter").join("settings.json"))
    }

    /// Reads the per-user settings file, falling back to defaults when it is
    /// absent or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Ignoring malformed settings file: {e}");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Reads an explicitly named settings file; unlike [`Settings::load`],
    /// a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read settings {}: {e}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .map_err(|e| format!("Invalid settings {}: {e}", path.display()))?;
        Ok(settings)
    }

    pub fn crop_settings(&self) -> CropSettings {
        CropSettings {
            target_size: self.target_size,
            target_anchor: AnchorPoint::new(self.anchor_x, self.anchor_y),
            output_prefix: self.output_prefix.clone(),
        }
    }
}
