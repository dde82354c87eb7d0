pub mod batch_center_faces_use_case;
pub mod batch_executor;
pub mod center_face_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod processing_result;
