use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cropping::domain::crop_resizer::CropResizer;
use crate::cropping::domain::region_planner::{compute_anchor_point, compute_crop_region};
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::pipeline_logger::{PipelineLogger, STAGE_CROP, STAGE_DECODE, STAGE_DETECT, STAGE_ENCODE};
use crate::pipeline::processing_result::{ProcessingOutcome, ProcessingResult};
use crate::shared::crop_settings::CropSettings;
use crate::shared::frame::Frame;

/// The collaborators of [`CenterFaceUseCase`], for executors that drive the
/// stages on separate threads.
pub struct CenterFaceParts {
    pub reader: Box<dyn ImageReader>,
    pub detector: Box<dyn FaceDetector>,
    pub resizer: Box<dyn CropResizer>,
    pub writer: Box<dyn ImageWriter>,
    pub settings: CropSettings,
}

/// Single-image pipeline: read → detect → plan → crop → write.
///
/// Every failure becomes a [`ProcessingOutcome`]; nothing escapes to the
/// caller, so one bad file never stops a batch.
pub struct CenterFaceUseCase {
    parts: CenterFaceParts,
}

impl CenterFaceUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        resizer: Box<dyn CropResizer>,
        writer: Box<dyn ImageWriter>,
        settings: CropSettings,
    ) -> Self {
        Self {
            parts: CenterFaceParts {
                reader,
                detector,
                resizer,
                writer,
                settings,
            },
        }
    }

    pub fn into_parts(self) -> CenterFaceParts {
        self.parts
    }

    /// Processes one input file, writing `<prefix><file name>` into
    /// `output_dir` on success.
    pub fn process_one(
        &mut self,
        input: &Path,
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> ProcessingResult {
        ProcessingResult::new(display_name(input), self.run(input, output_dir, logger))
    }

    fn run(
        &mut self,
        input: &Path,
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> ProcessingOutcome {
        let parts = &mut self.parts;

        let started = Instant::now();
        let frame = match parts.reader.read(input) {
            Ok(frame) => frame,
            Err(e) => return ProcessingOutcome::ReadError(e.to_string()),
        };
        logger.timing(STAGE_DECODE, elapsed_ms(started));

        let normalized = match normalize(
            parts.detector.as_mut(),
            parts.resizer.as_ref(),
            &parts.settings,
            &frame,
            logger,
        ) {
            Ok(Some(normalized)) => normalized,
            Ok(None) => return ProcessingOutcome::NoFaceDetected,
            Err(e) => return ProcessingOutcome::OtherError(e.to_string()),
        };
        drop(frame);

        let output = match output_path(&parts.settings, input, output_dir) {
            Ok(path) => path,
            Err(e) => return ProcessingOutcome::OtherError(e),
        };

        let started = Instant::now();
        if let Err(e) = parts.writer.write(&output, &normalized) {
            return ProcessingOutcome::OtherError(e.to_string());
        }
        logger.timing(STAGE_ENCODE, elapsed_ms(started));

        ProcessingOutcome::Success
    }
}

/// Detects the face, plans the crop and resamples to the output canvas.
///
/// `Ok(None)` means the detector found no face.
pub(crate) fn normalize(
    detector: &mut dyn FaceDetector,
    resizer: &dyn CropResizer,
    settings: &CropSettings,
    frame: &Frame,
    logger: &mut dyn PipelineLogger,
) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
    let started = Instant::now();
    let detection = detector.detect(frame)?;
    logger.timing(STAGE_DETECT, elapsed_ms(started));

    let Some(detection) = detection else {
        return Ok(None);
    };

    let started = Instant::now();
    let anchor = compute_anchor_point(&detection.face, &detection.eyes);
    let region = compute_crop_region(
        anchor,
        frame.dimensions(),
        settings.target_size,
        settings.target_anchor,
    );
    log::debug!(
        "face {:?}, {} eyes, anchor {:?} → region {:?}",
        detection.face,
        detection.eyes.len(),
        anchor,
        region
    );
    let normalized = resizer.extract_and_normalize(frame, &region, settings.target_size)?;
    logger.timing(STAGE_CROP, elapsed_ms(started));

    Ok(Some(normalized))
}

/// Output location for `input`: same file name with the configured prefix.
pub fn output_path(settings: &CropSettings, input: &Path, output_dir: &Path) -> Result<PathBuf, String> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Input has no usable file name: {}", input.display()))?;
    Ok(output_dir.join(settings.output_name(name)))
}

pub(crate) fn display_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
