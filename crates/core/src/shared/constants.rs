pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Side length of the square output canvas.
pub const TARGET_SIZE: u32 = 512;

/// Where the anchor lands in the output canvas: centred horizontally,
/// eye-line in the upper third (512 / 3 ≈ 170).
pub const TARGET_ANCHOR_X: i32 = 256;
pub const TARGET_ANCHOR_Y: i32 = 170;

pub const OUTPUT_PREFIX: &str = "processed_";
