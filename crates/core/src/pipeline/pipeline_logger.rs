use std::collections::BTreeMap;
use std::time::Instant;

use crate::pipeline::processing_result::{ProcessingOutcome, ProcessingResult};

pub const STAGE_DECODE: &str = "decode";
pub const STAGE_DETECT: &str = "detect";
pub const STAGE_CROP: &str = "crop";
pub const STAGE_ENCODE: &str = "encode";

/// Observer for batch orchestration events.
///
/// Keeps the use cases free of any particular output mechanism; executors
/// report into it and the caller decides what is printed.
pub trait PipelineLogger: Send {
    /// Report item-level progress after each input finishes.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one image.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record the outcome of one input.
    fn item(&mut self, result: &ProcessingResult);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn item(&mut self, _result: &ProcessingResult) {}
}

/// Logs each outcome through the `log` facade and aggregates per-stage
/// timings for an end-of-batch report.
///
/// Progress lines are throttled to every `throttle_items` inputs.
pub struct StdoutPipelineLogger {
    throttle_items: usize,
    timings: BTreeMap<String, Vec<f64>>,
    outcomes: BTreeMap<&'static str, usize>,
    start_time: Instant,
    total_items: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_items: usize) -> Self {
        Self {
            throttle_items: throttle_items.max(1),
            timings: BTreeMap::new(),
            outcomes: BTreeMap::new(),
            start_time: Instant::now(),
            total_items: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.outcomes.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let items = self.total_items;
        let mut lines = vec![format!(
            "Batch summary ({items} images, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        for (kind, count) in &self.outcomes {
            lines.push(format!("  {kind}: {count}"));
        }

        if items > 0 && elapsed_ms > 0.0 {
            let rate = items as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.1} images/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn outcome_count(&self, kind: &str) -> usize {
        self.outcomes.get(kind).copied().unwrap_or(0)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

fn outcome_kind(outcome: &ProcessingOutcome) -> &'static str {
    match outcome {
        ProcessingOutcome::Success => "processed",
        ProcessingOutcome::NoFaceDetected => "no_face",
        ProcessingOutcome::ReadError(_) => "read_error",
        ProcessingOutcome::OtherError(_) => "other_error",
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_items = total;
        if total > 0 && (current % self.throttle_items == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Progress: {current}/{total} images ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn item(&mut self, result: &ProcessingResult) {
        *self.outcomes.entry(outcome_kind(&result.outcome)).or_default() += 1;
        match &result.outcome {
            ProcessingOutcome::Success => log::info!("Processed: {}", result.filename),
            ProcessingOutcome::NoFaceDetected => {
                log::warn!("No face detected in {}", result.filename)
            }
            ProcessingOutcome::ReadError(e) => {
                log::warn!("Could not read {}: {e}", result.filename)
            }
            ProcessingOutcome::OtherError(e) => {
                log::warn!("Error processing {}: {e}", result.filename)
            }
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
