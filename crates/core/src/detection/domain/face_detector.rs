use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// The chosen face in an image and the eyes found inside it.
///
/// Eye boxes are in full-image coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceDetection {
    pub face: BoundingBox,
    pub eyes: Vec<BoundingBox>,
}

/// Domain interface for face and eye detection.
///
/// Returns `Ok(None)` when the image contains no face. When several faces are
/// present the implementation reports only the largest by area, with eyes
/// restricted to that face (see [`select_primary_face`]).
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceDetection>, Box<dyn std::error::Error>>;
}

/// Picks the largest candidate face by `width * height` and keeps only the
/// eyes whose centres fall inside it.
///
/// Ties keep the earliest candidate.
pub fn select_primary_face(candidates: Vec<FaceDetection>) -> Option<FaceDetection> {
    let mut best: Option<FaceDetection> = None;
    for candidate in candidates {
        if best
            .as_ref()
            .map_or(true, |b| candidate.face.area() > b.face.area())
        {
            best = Some(candidate);
        }
    }

    best.map(|FaceDetection { face, eyes }| FaceDetection {
        face,
        eyes: eyes
            .into_iter()
            .filter(|eye| face.contains(eye.center()))
            .collect(),
    })
}
