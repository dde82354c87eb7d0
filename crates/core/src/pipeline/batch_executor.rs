use std::path::{Path, PathBuf};

use crate::pipeline::center_face_use_case::CenterFaceUseCase;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::processing_result::ProcessingResult;

/// Abstracts how the per-item pipeline is driven across a batch.
///
/// Implementations return exactly one result per input, in input order, and
/// report each result to the logger as it completes.
pub trait BatchExecutor: Send {
    fn execute(
        &self,
        use_case: CenterFaceUseCase,
        inputs: &[PathBuf],
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<ProcessingResult>;
}

/// Loads, processes, writes and releases one image before starting the next.
pub struct SequentialBatchExecutor;

impl BatchExecutor for SequentialBatchExecutor {
    fn execute(
        &self,
        mut use_case: CenterFaceUseCase,
        inputs: &[PathBuf],
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<ProcessingResult> {
        let total = inputs.len();
        let mut results = Vec::with_capacity(total);
        for (i, input) in inputs.iter().enumerate() {
            let result = use_case.process_one(input, output_dir, logger);
            logger.item(&result);
            logger.progress(i + 1, total);
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::cropping::infrastructure::lanczos_crop_resizer::LanczosCropResizer;
    use crate::pipeline::center_face_use_case::test_support::*;
    use crate::pipeline::pipeline_logger::StdoutPipelineLogger;
    use crate::pipeline::processing_result::ProcessingOutcome;
    use crate::shared::crop_settings::CropSettings;
    use crate::shared::frame::Frame;
    use crate::shared::geometry::BoundingBox;

    #[test]
    fn test_results_follow_input_order_and_never_short_circuit() {
        let frames = HashMap::from([
            ("a.png".to_string(), coordinate_frame(40, 40)),
            ("c.png".to_string(), Frame::new(vec![0u8; 40 * 40 * 3], 40, 40, 3)),
            ("d.png".to_string(), coordinate_frame(40, 40)),
        ]);
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let use_case = CenterFaceUseCase::new(
            Box::new(StubReader { frames }),
            Box::new(StubDetector {
                face: BoundingBox::new(10, 10, 20, 20).unwrap(),
                eyes: vec![],
            }),
            Box::new(LanczosCropResizer::new()),
            Box::new(writer),
            CropSettings::default(),
        );
        let inputs: Vec<PathBuf> = ["a.png", "b.png", "c.png", "d.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let mut logger = StdoutPipelineLogger::new(1);

        let results =
            SequentialBatchExecutor.execute(use_case, &inputs, Path::new("out"), &mut logger);

        let outcomes: Vec<_> = results.iter().map(|r| (r.filename.as_str(), &r.outcome)).collect();
        assert_eq!(outcomes[0], ("a.png", &ProcessingOutcome::Success));
        assert!(matches!(outcomes[1], ("b.png", ProcessingOutcome::ReadError(_))));
        assert_eq!(outcomes[2], ("c.png", &ProcessingOutcome::NoFaceDetected));
        assert_eq!(outcomes[3], ("d.png", &ProcessingOutcome::Success));
        assert_eq!(written.lock().unwrap().len(), 2);
        assert_eq!(logger.outcome_count("processed"), 2);
    }
}
