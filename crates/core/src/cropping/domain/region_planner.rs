//! Crop-window geometry: where the subject is, and which fixed-size window of
//! the source puts it at the target anchor.
//!
//! Out-of-bounds windows are shifted, not re-centred, so the crop keeps its
//! full size whenever the source is large enough. The anchor then lands off
//! target by the shifted amount.

use crate::shared::geometry::{AnchorPoint, BoundingBox, CropRegion, ImageDimensions};

/// Where the subject currently is.
///
/// With two or more eyes, the midpoint of the leftmost and rightmost eye
/// centres (by box x); any eyes in between are ignored. Otherwise the face
/// centre.
pub fn compute_anchor_point(face: &BoundingBox, eyes: &[BoundingBox]) -> AnchorPoint {
    if eyes.len() < 2 {
        return face.center();
    }

    let mut sorted: Vec<&BoundingBox> = eyes.iter().collect();
    sorted.sort_by_key(|eye| eye.x);
    let left = sorted[0];
    let right = sorted[sorted.len() - 1];

    AnchorPoint::midpoint(left.center(), right.center())
}

/// The `target_size` square window that maps `anchor` onto `target_anchor`,
/// clamped into the image.
///
/// When the image is smaller than `target_size` in an axis the region spans
/// that whole axis and is narrower than `target_size`.
pub fn compute_crop_region(
    anchor: AnchorPoint,
    dims: ImageDimensions,
    target_size: u32,
    target_anchor: AnchorPoint,
) -> CropRegion {
    let size = to_i32(target_size);
    let (left, right) = clamp_axis(
        anchor.x.saturating_sub(target_anchor.x),
        size,
        to_i32(dims.width),
    );
    let (top, bottom) = clamp_axis(
        anchor.y.saturating_sub(target_anchor.y),
        size,
        to_i32(dims.height),
    );
    CropRegion::new(left, top, right, bottom)
}

/// Shifts the window `[start, start + size)` into `[0, extent)`, then trims
/// whatever still overhangs (only possible when `extent < size`).
fn clamp_axis(start: i32, size: i32, extent: i32) -> (i32, i32) {
    let mut start = start;
    if start < 0 {
        start = 0;
    } else if start.saturating_add(size) > extent {
        start = extent - size;
    }

    let start = start.max(0);
    (start, extent.min(start.saturating_add(size)))
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SIZE: u32 = 512;

    fn bbox(x: i32, y: i32, w: i32, h: i32) -> BoundingBox {
        BoundingBox::new(x, y, w, h).unwrap()
    }

    fn target() -> AnchorPoint {
        AnchorPoint::new(256, 170)
    }

    fn square(side: u32) -> ImageDimensions {
        ImageDimensions::new(side, side)
    }

    // ── Anchor ───────────────────────────────────────────────────────

    #[test]
    fn test_anchor_falls_back_to_face_center_without_eyes() {
        let face = bbox(450, 450, 100, 100);
        assert_eq!(compute_anchor_point(&face, &[]), AnchorPoint::new(500, 500));
    }

    #[test]
    fn test_anchor_ignores_single_eye() {
        let face = bbox(0, 0, 41, 61);
        let eyes = [bbox(5, 5, 10, 10)];
        assert_eq!(compute_anchor_point(&face, &eyes), AnchorPoint::new(20, 30));
    }

    #[test]
    fn test_anchor_is_eye_midpoint_independent_of_face() {
        let eyes = [bbox(100, 100, 20, 20), bbox(180, 100, 20, 20)];
        for face in [bbox(0, 0, 10, 10), bbox(900, 900, 300, 300)] {
            assert_eq!(compute_anchor_point(&face, &eyes), AnchorPoint::new(150, 110));
        }
    }

    #[test]
    fn test_anchor_eye_order_does_not_matter() {
        let face = bbox(0, 0, 10, 10);
        let eyes = [bbox(180, 100, 20, 20), bbox(100, 100, 20, 20)];
        assert_eq!(compute_anchor_point(&face, &eyes), AnchorPoint::new(150, 110));
    }

    #[test]
    fn test_anchor_uses_only_x_extremes_of_many_eyes() {
        let face = bbox(0, 0, 10, 10);
        let eyes = [
            bbox(140, 400, 20, 20),
            bbox(100, 100, 20, 20),
            bbox(180, 120, 20, 20),
        ];
        // (110,110) and (190,130) → (150,120); the middle box is ignored
        assert_eq!(compute_anchor_point(&face, &eyes), AnchorPoint::new(150, 120));
    }

    #[test]
    fn test_anchor_eye_centers_use_integer_division() {
        let face = bbox(0, 0, 10, 10);
        let eyes = [bbox(0, 0, 5, 5), bbox(10, 1, 5, 5)];
        // centres (2,2) and (12,3) → (7, 2)
        assert_eq!(compute_anchor_point(&face, &eyes), AnchorPoint::new(7, 2));
    }

    // ── Crop region ──────────────────────────────────────────────────

    #[test]
    fn test_centered_face_needs_no_clamping() {
        let anchor = compute_anchor_point(&bbox(450, 450, 100, 100), &[]);
        let region = compute_crop_region(anchor, square(1000), SIZE, target());
        assert_eq!(region, CropRegion::new(244, 330, 756, 842));
        assert_eq!((region.width(), region.height()), (512, 512));
    }

    #[test]
    fn test_top_left_corner_clamps_to_origin() {
        let region = compute_crop_region(AnchorPoint::new(10, 10), square(1000), SIZE, target());
        assert_eq!(region, CropRegion::new(0, 0, 512, 512));
    }

    #[test]
    fn test_bottom_right_corner_clamps_to_far_edges() {
        let region = compute_crop_region(AnchorPoint::new(990, 990), square(1000), SIZE, target());
        assert_eq!(region, CropRegion::new(488, 488, 1000, 1000));
        assert_eq!((region.width(), region.height()), (512, 512));
    }

    #[test]
    fn test_axes_clamp_independently() {
        let region = compute_crop_region(AnchorPoint::new(10, 500), square(1000), SIZE, target());
        assert_eq!(region, CropRegion::new(0, 330, 512, 842));
    }

    #[test]
    fn test_window_touching_edge_is_not_shifted() {
        // right == width exactly
        let region = compute_crop_region(AnchorPoint::new(744, 500), square(1000), SIZE, target());
        assert_eq!(region.left, 488);
        assert_eq!(region.right, 1000);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(150, 150)]
    #[case(299, 299)]
    #[case(-50, 400)]
    #[case(10_000, -10_000)]
    fn test_undersized_image_region_spans_image(#[case] ax: i32, #[case] ay: i32) {
        let dims = square(300);
        let region = compute_crop_region(AnchorPoint::new(ax, ay), dims, SIZE, target());
        assert_eq!(region, CropRegion::new(0, 0, 300, 300));
        assert!(region.fits_within(dims));
    }

    #[test]
    fn test_narrow_image_only_shrinks_short_axis() {
        let dims = ImageDimensions::new(400, 1000);
        let region = compute_crop_region(AnchorPoint::new(200, 500), dims, SIZE, target());
        assert_eq!(region, CropRegion::new(0, 330, 400, 842));
    }

    #[rstest]
    #[case(1000, 1000)]
    #[case(640, 480)]
    #[case(512, 512)]
    #[case(300, 2000)]
    fn test_region_always_fits_and_is_non_empty(#[case] w: u32, #[case] h: u32) {
        let dims = ImageDimensions::new(w, h);
        for ax in [-100, 0, 256, (w / 2) as i32, w as i32, w as i32 + 100] {
            for ay in [-100, 0, 170, (h / 2) as i32, h as i32, h as i32 + 100] {
                let r = compute_crop_region(AnchorPoint::new(ax, ay), dims, SIZE, target());
                assert!(r.fits_within(dims), "{r:?} outside {dims:?}");
                assert!(!r.is_empty());
                assert_eq!(r.width() as u32, w.min(SIZE));
                assert_eq!(r.height() as u32, h.min(SIZE));
            }
        }
    }

    #[test]
    fn test_custom_canvas() {
        let region = compute_crop_region(
            AnchorPoint::new(500, 500),
            square(1000),
            256,
            AnchorPoint::new(128, 85),
        );
        assert_eq!(region, CropRegion::new(372, 415, 628, 671));
    }
}
