use std::fmt;

/// A struct representing a bounding box.
///
/// A bounding box is the axis-aligned rectangle a detector draws around an object. Here it is a
/// plain value: the class tag and confidence live on the `Detection` that wraps it.
///
/// This project uses the standard convention of the left side of the image being x=0 and the top
/// of the image being y=0. Boxes with zero width or zero height are legal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

/// Errors raised when constructing a box from corners that do not describe a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingBoxError {
    InvertedHorizontal { left: f32, right: f32 },
    InvertedVertical { top: f32, bottom: f32 },
    NonFinite,
}

impl fmt::Display for BoundingBoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundingBoxError::InvertedHorizontal { left, right } => write!(
                f,
                "Failed to create BoundingBox, value for left > value for right ({} > {}).",
                left, right
            ),
            BoundingBoxError::InvertedVertical { top, bottom } => write!(
                f,
                "Failed to create BoundingBox, value for top > value for bottom ({} > {}).",
                top, bottom
            ),
            BoundingBoxError::NonFinite => {
                write!(f, "Failed to create BoundingBox, a corner is NaN or infinite.")
            }
        }
    }
}

impl std::error::Error for BoundingBoxError {}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Result<Self, BoundingBoxError> {
        if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
            Err(BoundingBoxError::NonFinite)
        } else if left > right {
            Err(BoundingBoxError::InvertedHorizontal { left, right })
        } else if top > bottom {
            Err(BoundingBoxError::InvertedVertical { top, bottom })
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
            })
        }
    }

    /// Builds a box from a center point and a size, as YOLO heads report them.
    pub fn from_center(
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
    ) -> Result<Self, BoundingBoxError> {
        BoundingBox::new(
            center_x - (width / 2.0),
            center_y - (height / 2.0),
            center_x + (width / 2.0),
            center_y + (height / 2.0),
        )
    }

    /// Returns a copy whose corners are clamped into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f32, height: f32) -> BoundingBox {
        BoundingBox {
            left: self.left.clamp(0.0, width),
            top: self.top.clamp(0.0, height),
            right: self.right.clamp(0.0, width),
            bottom: self.bottom.clamp(0.0, height),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Geometry shared by anything that has a rectangle in image space.
pub trait BoundingBoxGeometry {
    fn left(&self) -> f32;
    fn top(&self) -> f32;
    fn right(&self) -> f32;
    fn bottom(&self) -> f32;

    fn width(&self) -> f32 {
        self.right() - self.left()
    }

    fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    fn area(&self) -> f32 {
        self.width() * self.height()
    }

    fn center(&self) -> (f32, f32) {
        (
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }

    fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self.left(), self.top(), self.right(), self.bottom())
    }

    /// Area shared by the two rectangles; zero when they do not overlap.
    fn intersection_area(&self, other: &impl BoundingBoxGeometry) -> f32 {
        let width = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let height = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);
        width * height
    }

    fn intersection_over_union(&self, other: &impl BoundingBoxGeometry) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}

impl BoundingBoxGeometry for BoundingBox {
    fn left(&self) -> f32 {
        self.left
    }

    fn top(&self) -> f32 {
        self.top
    }

    fn right(&self) -> f32 {
        self.right
    }

    fn bottom(&self) -> f32 {
        self.bottom
    }
}
