pub mod crop_resizer;
pub mod region_planner;
