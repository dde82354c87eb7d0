use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("bounding box must have positive extent, got {width}x{height}")]
    EmptyBox { width: i32, height: i32 },
}

/// Axis-aligned rectangle in source-image pixel coordinates (top-left origin).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self, GeometryError> {
        if width <= 0 || height <= 0 {
            return Err(GeometryError::EmptyBox { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Integer centre, rounding toward the origin.
    pub fn center(&self) -> AnchorPoint {
        AnchorPoint::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, point: AnchorPoint) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A single point in source-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorPoint {
    pub x: i32,
    pub y: i32,
}

impl AnchorPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Per-axis integer average, rounding like floor division on the sum.
    pub fn midpoint(a: AnchorPoint, b: AnchorPoint) -> Self {
        Self {
            x: (a.x + b.x).div_euclid(2),
            y: (a.y + b.y).div_euclid(2),
        }
    }
}

/// Crop rectangle as edges: `left..right` by `top..bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CropRegion {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// True when the region lies entirely within an image of `dims`.
    pub fn fits_within(&self, dims: ImageDimensions) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right as i64 <= dims.width as i64
            && self.bottom as i64 <= dims.height as i64
    }
}
