pub mod lanczos_crop_resizer;
