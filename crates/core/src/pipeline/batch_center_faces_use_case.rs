use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::imaging::infrastructure::image_discovery::discover_images;
use crate::pipeline::batch_executor::BatchExecutor;
use crate::pipeline::center_face_use_case::CenterFaceUseCase;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::processing_result::BatchSummary;

/// Conditions that stop a batch as a whole.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input folder does not exist: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Input path is not a folder: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("No image files found in {}", .0.display())]
    NoImagesFound(PathBuf),
    #[error("Could not list {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not create output folder {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No images were processed successfully ({} failed)", .0.failure_count)]
    NothingProcessed(BatchSummary),
}

/// Folder-to-folder normalization: discover → per-item pipeline → tally.
///
/// Single-use: both entry points consume the struct along with the
/// components it owns.
pub struct BatchCenterFacesUseCase {
    use_case: CenterFaceUseCase,
    executor: Box<dyn BatchExecutor>,
}

impl BatchCenterFacesUseCase {
    pub fn new(use_case: CenterFaceUseCase, executor: Box<dyn BatchExecutor>) -> Self {
        Self { use_case, executor }
    }

    /// Processes `inputs` in the given order, continuing past every
    /// per-item failure.
    pub fn process_batch(
        self,
        inputs: &[PathBuf],
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> BatchSummary {
        let results = self.executor.execute(self.use_case, inputs, output_dir, logger);
        BatchSummary::from_results(results)
    }

    /// Validates `input_dir`, prepares `output_dir` and processes every
    /// supported image found directly inside the input folder.
    ///
    /// Fails with [`BatchError::NothingProcessed`] when not a single image
    /// succeeded; the summary is carried in the error.
    pub fn run(
        self,
        input_dir: &Path,
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<BatchSummary, BatchError> {
        if !input_dir.exists() {
            return Err(BatchError::InputNotFound(input_dir.to_path_buf()));
        }
        if !input_dir.is_dir() {
            return Err(BatchError::NotADirectory(input_dir.to_path_buf()));
        }

        let inputs = discover_images(input_dir).map_err(|source| BatchError::Discovery {
            path: input_dir.to_path_buf(),
            source,
        })?;
        if inputs.is_empty() {
            return Err(BatchError::NoImagesFound(input_dir.to_path_buf()));
        }
        log::info!("Found {} images in {}", inputs.len(), input_dir.display());

        std::fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let summary = self.process_batch(&inputs, output_dir, logger);
        log::info!(
            "Processing complete: {} succeeded, {} failed",
            summary.success_count,
            summary.failure_count
        );

        if !summary.is_success() {
            return Err(BatchError::NothingProcessed(summary));
        }
        Ok(summary)
    }
}
