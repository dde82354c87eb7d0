mod settings;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use facecenter_core::cropping::infrastructure::lanczos_crop_resizer::LanczosCropResizer;
use facecenter_core::detection::domain::face_detector::FaceDetector;
use facecenter_core::detection::infrastructure::model_resolver;
use facecenter_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use facecenter_core::imaging::infrastructure::image_discovery::discover_images;
use facecenter_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facecenter_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facecenter_core::pipeline::batch_center_faces_use_case::{
    BatchCenterFacesUseCase, BatchError,
};
use facecenter_core::pipeline::batch_executor::{BatchExecutor, SequentialBatchExecutor};
use facecenter_core::pipeline::center_face_use_case::CenterFaceUseCase;
use facecenter_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use facecenter_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use facecenter_core::pipeline::processing_result::BatchSummary;
use facecenter_core::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};

use settings::Settings;

/// Crops every face photo in a folder to a square canvas with the eyes at a
/// fixed position.
#[derive(Parser)]
#[command(name = "facecenter")]
struct Cli {
    /// Folder containing the input images.
    input: PathBuf,

    /// Folder for the processed images (created if missing).
    output: PathBuf,

    /// Output canvas side length in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Horizontal position of the eye midpoint on the canvas.
    #[arg(long)]
    anchor_x: Option<i32>,

    /// Vertical position of the eye midpoint on the canvas.
    #[arg(long)]
    anchor_y: Option<i32>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Overlap decoding and encoding with detection on separate threads.
    #[arg(long)]
    pipelined: bool,

    /// Settings file to use instead of the per-user one.
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    validate(&cli, &settings)?;

    let detector = build_detector(settings.confidence)?;
    let executor: Box<dyn BatchExecutor> = if settings.pipelined {
        Box::new(ThreadedBatchExecutor::new())
    } else {
        Box::new(SequentialBatchExecutor)
    };

    let use_case = CenterFaceUseCase::new(
        Box::new(ImageFileReader::new()),
        detector,
        Box::new(LanczosCropResizer::new()),
        Box::new(ImageFileWriter::new()),
        settings.crop_settings(),
    );
    let mut logger = StdoutPipelineLogger::default();

    let result = BatchCenterFacesUseCase::new(use_case, executor).run(
        &cli.input,
        &cli.output,
        &mut logger,
    );
    logger.summary();
    if let Err(BatchError::NothingProcessed(summary)) = &result {
        eprintln!("{}", failure_report(summary));
    }
    let summary = result?;

    println!(
        "Processed {} of {} images ({} failed). Output: {}",
        summary.success_count,
        summary.results.len(),
        summary.failure_count,
        cli.output.display()
    );
    Ok(())
}

/// Settings file first, then any flag given on the command line.
fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    if let Some(size) = cli.size {
        settings.target_size = size;
    }
    if let Some(x) = cli.anchor_x {
        settings.anchor_x = x;
    }
    if let Some(y) = cli.anchor_y {
        settings.anchor_y = y;
    }
    if let Some(confidence) = cli.confidence {
        settings.confidence = confidence;
    }
    settings.pipelined |= cli.pipelined;
    Ok(settings)
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input folder not found: {}", cli.input.display()).into());
    }
    if !cli.input.is_dir() {
        return Err(format!("Input path is not a folder: {}", cli.input.display()).into());
    }
    if !(0.0..=1.0).contains(&settings.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            settings.confidence
        )
        .into());
    }
    settings.crop_settings().validate()?;

    let images = discover_images(&cli.input)
        .map_err(|e| format!("Cannot list {}: {e}", cli.input.display()))?;
    if images.is_empty() {
        return Err(BatchError::NoImagesFound(cli.input.clone()).into());
    }
    Ok(())
}

/// One line per failed input with the reason it failed.
fn failure_report(summary: &BatchSummary) -> String {
    let lines: Vec<String> = summary
        .failures()
        .map(|r| format!("  {}: {}", r.filename, r.outcome))
        .collect();
    format!("Failed images:\n{}", lines.join("\n"))
}

fn build_detector(confidence: f64) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    Ok(Box::new(OnnxYoloDetector::new(&model_path, confidence)?))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
