use std::fmt;

/// How processing a single input ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Success,
    NoFaceDetected,
    /// The file could not be opened or decoded.
    ReadError(String),
    /// Detection, cropping or writing failed.
    OtherError(String),
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingOutcome::Success => write!(f, "processed"),
            ProcessingOutcome::NoFaceDetected => write!(f, "no face detected"),
            ProcessingOutcome::ReadError(e) => write!(f, "could not read: {e}"),
            ProcessingOutcome::OtherError(e) => write!(f, "error: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingResult {
    pub filename: String,
    pub outcome: ProcessingOutcome,
}

impl ProcessingResult {
    pub fn new(filename: impl Into<String>, outcome: ProcessingOutcome) -> Self {
        Self {
            filename: filename.into(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ProcessingOutcome::Success
    }
}

/// Per-item results of a batch, in input order, with their tallies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<ProcessingResult>,
}

impl BatchSummary {
    pub fn from_results(results: Vec<ProcessingResult>) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count();
        Self {
            success_count,
            failure_count: results.len() - success_count,
            results,
        }
    }

    /// A batch succeeds when at least one item did, whatever else failed.
    pub fn is_success(&self) -> bool {
        self.success_count > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tallies_outcomes() {
        let summary = BatchSummary::from_results(vec![
            ProcessingResult::new("a.jpg", ProcessingOutcome::Success),
            ProcessingResult::new("b.jpg", ProcessingOutcome::NoFaceDetected),
            ProcessingResult::new("c.jpg", ProcessingOutcome::ReadError("bad".into())),
            ProcessingResult::new("d.jpg", ProcessingOutcome::Success),
        ]);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 2);
        assert!(summary.is_success());
        let failed: Vec<_> = summary.failures().map(|r| r.filename.as_str()).collect();
        assert_eq!(failed, vec!["b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_all_failures_is_not_success() {
        let summary = BatchSummary::from_results(vec![ProcessingResult::new(
            "a.jpg",
            ProcessingOutcome::OtherError("boom".into()),
        )]);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_empty_batch_is_not_success() {
        assert!(!BatchSummary::from_results(Vec::new()).is_success());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            ProcessingOutcome::ReadError("eof".into()).to_string(),
            "could not read: eof"
        );
        assert_eq!(ProcessingOutcome::NoFaceDetected.to_string(), "no face detected");
    }
}
