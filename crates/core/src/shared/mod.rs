pub mod constants;
pub mod crop_settings;
pub mod frame;
pub mod geometry;
