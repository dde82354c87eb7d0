use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use crate::cropping::domain::crop_resizer::CropResizer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::batch_executor::BatchExecutor;
use crate::pipeline::center_face_use_case::{
    display_name, elapsed_ms, normalize, output_path, CenterFaceParts, CenterFaceUseCase,
};
use crate::pipeline::pipeline_logger::{PipelineLogger, STAGE_DECODE, STAGE_ENCODE};
use crate::pipeline::processing_result::{ProcessingOutcome, ProcessingResult};
use crate::shared::crop_settings::CropSettings;
use crate::shared::frame::Frame;

const DEFAULT_CHANNEL_CAPACITY: usize = 4;

struct Decoded {
    index: usize,
    frame: Result<Frame, String>,
    decode_ms: f64,
}

struct WriteJob {
    index: usize,
    path: PathBuf,
    frame: Frame,
}

struct Written {
    index: usize,
    result: Result<(), String>,
    encode_ms: f64,
}

/// Executes the batch with dedicated threads for decoding and encoding.
///
/// Layout: `reader → main [detect/plan/crop] → writer`
///
/// The detector stays on the calling thread, so a single non-`Sync`
/// detector instance serves the whole batch while I/O overlaps with it.
pub struct ThreadedBatchExecutor {
    channel_capacity: usize,
}

impl ThreadedBatchExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchExecutor for ThreadedBatchExecutor {
    fn execute(
        &self,
        use_case: CenterFaceUseCase,
        inputs: &[PathBuf],
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<ProcessingResult> {
        let CenterFaceParts {
            reader,
            mut detector,
            resizer,
            writer,
            settings,
        } = use_case.into_parts();
        let cap = self.channel_capacity;

        let (decoded_tx, decoded_rx) = crossbeam_channel::bounded::<Decoded>(cap);
        let (write_tx, write_rx) = crossbeam_channel::bounded::<WriteJob>(cap);
        // Unbounded so the writer never blocks while main waits on `write_tx`.
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<Written>();

        let reader_handle = spawn_reader(reader, inputs.to_vec(), decoded_tx);
        let writer_handle = spawn_writer(writer, write_rx, done_tx);

        let mut tally = Tally::new(inputs);
        let mut stage = DetectStage {
            detector: detector.as_mut(),
            resizer: resizer.as_ref(),
            settings: &settings,
            inputs,
            output_dir,
            write_tx: &write_tx,
        };

        let mut writer_gone = false;
        loop {
            crossbeam_channel::select! {
                recv(decoded_rx) -> msg => match msg {
                    Ok(decoded) => stage.handle(decoded, &mut tally, logger),
                    Err(_) => break,
                },
                recv(done_rx) -> msg => match msg {
                    Ok(written) => tally.finish_write(written, logger),
                    Err(_) => {
                        writer_gone = true;
                        break;
                    }
                },
            }
        }
        if writer_gone {
            for decoded in decoded_rx.iter() {
                stage.handle(decoded, &mut tally, logger);
            }
        }

        drop(write_tx);
        for written in done_rx.iter() {
            tally.finish_write(written, logger);
        }

        if reader_handle.join().is_err() {
            log::error!("Reader thread panicked");
        }
        if writer_handle.join().is_err() {
            log::error!("Writer thread panicked");
        }

        tally.into_results(logger)
    }
}

fn spawn_reader(
    reader: Box<dyn ImageReader>,
    inputs: Vec<PathBuf>,
    decoded_tx: Sender<Decoded>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, path) in inputs.iter().enumerate() {
            let started = Instant::now();
            let frame = reader.read(path).map_err(|e| e.to_string());
            let decoded = Decoded {
                index,
                frame,
                decode_ms: elapsed_ms(started),
            };
            if decoded_tx.send(decoded).is_err() {
                break;
            }
        }
    })
}

fn spawn_writer(
    writer: Box<dyn ImageWriter>,
    write_rx: Receiver<WriteJob>,
    done_tx: Sender<Written>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for job in write_rx {
            let started = Instant::now();
            let result = writer.write(&job.path, &job.frame).map_err(|e| e.to_string());
            let written = Written {
                index: job.index,
                result,
                encode_ms: elapsed_ms(started),
            };
            if done_tx.send(written).is_err() {
                break;
            }
        }
    })
}

/// The caller-thread stage: detect, plan and crop, then queue the write.
struct DetectStage<'a> {
    detector: &'a mut dyn FaceDetector,
    resizer: &'a dyn CropResizer,
    settings: &'a CropSettings,
    inputs: &'a [PathBuf],
    output_dir: &'a Path,
    write_tx: &'a Sender<WriteJob>,
}

impl DetectStage<'_> {
    fn handle(&mut self, decoded: Decoded, tally: &mut Tally, logger: &mut dyn PipelineLogger) {
        let index = decoded.index;
        let frame = match decoded.frame {
            Ok(frame) => frame,
            Err(e) => return tally.finish(index, ProcessingOutcome::ReadError(e), logger),
        };
        logger.timing(STAGE_DECODE, decoded.decode_ms);

        let normalized =
            match normalize(&mut *self.detector, self.resizer, self.settings, &frame, logger) {
                Ok(Some(normalized)) => normalized,
                Ok(None) => return tally.finish(index, ProcessingOutcome::NoFaceDetected, logger),
                Err(e) => {
                    let outcome = ProcessingOutcome::OtherError(e.to_string());
                    return tally.finish(index, outcome, logger);
                }
            };
        drop(frame);

        let path = match output_path(self.settings, &self.inputs[index], self.output_dir) {
            Ok(path) => path,
            Err(e) => return tally.finish(index, ProcessingOutcome::OtherError(e), logger),
        };
        let job = WriteJob {
            index,
            path,
            frame: normalized,
        };
        if self.write_tx.send(job).is_err() {
            let outcome = ProcessingOutcome::OtherError("Writer channel closed unexpectedly".into());
            tally.finish(index, outcome, logger);
        }
    }
}

/// Collects outcomes by input index and reports them as they settle.
struct Tally {
    names: Vec<String>,
    outcomes: Vec<Option<ProcessingOutcome>>,
    completed: usize,
}

impl Tally {
    fn new(inputs: &[PathBuf]) -> Self {
        Self {
            names: inputs.iter().map(|p| display_name(p)).collect(),
            outcomes: vec![None; inputs.len()],
            completed: 0,
        }
    }

    fn finish(&mut self, index: usize, outcome: ProcessingOutcome, logger: &mut dyn PipelineLogger) {
        let result = ProcessingResult::new(self.names[index].clone(), outcome.clone());
        self.outcomes[index] = Some(outcome);
        self.completed += 1;
        logger.item(&result);
        logger.progress(self.completed, self.outcomes.len());
    }

    fn finish_write(&mut self, written: Written, logger: &mut dyn PipelineLogger) {
        let outcome = match written.result {
            Ok(()) => {
                logger.timing(STAGE_ENCODE, written.encode_ms);
                ProcessingOutcome::Success
            }
            Err(e) => ProcessingOutcome::OtherError(e),
        };
        self.finish(written.index, outcome, logger);
    }

    /// Items a crashed stage never reported become failures.
    fn into_results(mut self, logger: &mut dyn PipelineLogger) -> Vec<ProcessingResult> {
        for index in 0..self.outcomes.len() {
            if self.outcomes[index].is_none() {
                let outcome =
                    ProcessingOutcome::OtherError("Pipeline stage stopped before completion".into());
                self.finish(index, outcome, logger);
            }
        }
        self.names
            .into_iter()
            .zip(self.outcomes)
            .filter_map(|(name, outcome)| outcome.map(|o| ProcessingResult::new(name, o)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::cropping::infrastructure::lanczos_crop_resizer::LanczosCropResizer;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::pipeline::batch_executor::SequentialBatchExecutor;
    use crate::pipeline::center_face_use_case::test_support::*;
    use crate::pipeline::pipeline_logger::{NullPipelineLogger, StdoutPipelineLogger};
    use crate::shared::crop_settings::CropSettings;
    use crate::shared::geometry::{AnchorPoint, BoundingBox};

    fn frames() -> HashMap<String, Frame> {
        let mut frames = HashMap::new();
        for i in 0..12 {
            frames.insert(format!("{i:02}.png"), coordinate_frame(60, 60));
        }
        frames.insert("blank.png".into(), Frame::new(vec![0u8; 60 * 60 * 3], 60, 60, 3));
        frames
    }

    fn inputs() -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = (0..12).map(|i| PathBuf::from(format!("{i:02}.png"))).collect();
        inputs.insert(3, PathBuf::from("blank.png"));
        inputs.insert(7, PathBuf::from("missing.png"));
        inputs
    }

    fn detector() -> Box<dyn FaceDetector> {
        Box::new(StubDetector {
            face: BoundingBox::new(20, 20, 20, 20).unwrap(),
            eyes: vec![],
        })
    }

    fn use_case(writer: StubWriter) -> CenterFaceUseCase {
        CenterFaceUseCase::new(
            Box::new(StubReader { frames: frames() }),
            detector(),
            Box::new(LanczosCropResizer::new()),
            Box::new(writer),
            CropSettings {
                target_size: 16,
                target_anchor: AnchorPoint::new(8, 5),
                ..CropSettings::default()
            },
        )
    }

    #[test]
    fn test_matches_sequential_results() {
        let threaded = ThreadedBatchExecutor::new().execute(
            use_case(StubWriter::new()),
            &inputs(),
            Path::new("out"),
            &mut NullPipelineLogger,
        );
        let sequential = SequentialBatchExecutor.execute(
            use_case(StubWriter::new()),
            &inputs(),
            Path::new("out"),
            &mut NullPipelineLogger,
        );
        assert_eq!(threaded, sequential);
        assert_eq!(threaded.len(), 14);
        assert_eq!(threaded[3].outcome, ProcessingOutcome::NoFaceDetected);
        assert!(matches!(threaded[7].outcome, ProcessingOutcome::ReadError(_)));
    }

    #[test]
    fn test_writes_every_success() {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut logger = StdoutPipelineLogger::new(5);

        let results = ThreadedBatchExecutor::new().execute(
            use_case(writer),
            &inputs(),
            Path::new("out"),
            &mut logger,
        );

        let successes = results.iter().filter(|r| r.is_success()).count();
        assert_eq!(successes, 12);
        assert_eq!(written.lock().unwrap().len(), 12);
        assert_eq!(logger.outcome_count("processed"), 12);
        assert_eq!(logger.timings_for(STAGE_ENCODE).unwrap().len(), 12);
    }

    #[test]
    fn test_write_failures_are_isolated_per_item() {
        let writer = StubWriter {
            fail: true,
            ..StubWriter::new()
        };
        let results = ThreadedBatchExecutor::new().execute(
            use_case(writer),
            &inputs(),
            Path::new("out"),
            &mut NullPipelineLogger,
        );
        assert_eq!(results.len(), 14);
        assert!(results.iter().all(|r| !r.is_success()));
        assert!(matches!(results[0].outcome, ProcessingOutcome::OtherError(_)));
        assert_eq!(results[3].outcome, ProcessingOutcome::NoFaceDetected);
    }

    struct PanickingWriter;

    impl ImageWriter for PanickingWriter {
        fn write(&self, _path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            panic!("encoder crashed");
        }
    }

    #[test]
    fn test_crashed_writer_still_yields_one_result_per_input() {
        let use_case = CenterFaceUseCase::new(
            Box::new(StubReader { frames: frames() }),
            detector(),
            Box::new(LanczosCropResizer::new()),
            Box::new(PanickingWriter),
            CropSettings {
                target_size: 16,
                target_anchor: AnchorPoint::new(8, 5),
                ..CropSettings::default()
            },
        );
        let mut logger = StdoutPipelineLogger::new(1);

        let results =
            ThreadedBatchExecutor::new().execute(use_case, &inputs(), Path::new("out"), &mut logger);

        let expected: Vec<String> = inputs()
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let names: Vec<String> = results.iter().map(|r| r.filename.clone()).collect();
        assert_eq!(names, expected);
        assert!(results.iter().all(|r| !r.is_success()));
        assert_eq!(results[3].outcome, ProcessingOutcome::NoFaceDetected);
        assert!(matches!(results[7].outcome, ProcessingOutcome::ReadError(_)));
        assert!(matches!(results[0].outcome, ProcessingOutcome::OtherError(_)));
        assert_eq!(logger.outcome_count("other_error"), 12);
        assert_eq!(logger.outcome_count("processed"), 0);
    }

    #[test]
    fn test_empty_batch() {
        let results = ThreadedBatchExecutor::new().execute(
            use_case(StubWriter::new()),
            &[],
            Path::new("out"),
            &mut NullPipelineLogger,
        );
        assert!(results.is_empty());
    }
}
