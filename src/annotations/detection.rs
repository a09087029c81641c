use crate::annotations::bounding_box::BoundingBox;
use std::fmt;

/// What a detection is claimed to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionClass {
    Person,
    Vest,
    /// A raw model class that has not yet been mapped to one of the above.
    Other(usize),
}

impl fmt::Display for DetectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionClass::Person => write!(f, "person"),
            DetectionClass::Vest => write!(f, "vest"),
            DetectionClass::Other(id) => write!(f, "class {}", id),
        }
    }
}

/// A detection is what is produced as output from an object detection model.
///
/// A detection is a bounding box combined with a confidence score: a probability value that
/// encodes the model's belief that the detection is true. Detections only live for the image
/// they were produced from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub annotation: BoundingBox,
    pub confidence: f32,
    pub class: DetectionClass,
}

impl Detection {
    pub fn new(annotation: BoundingBox, confidence: f32, class: DetectionClass) -> Self {
        Detection {
            annotation,
            confidence,
            class,
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2} at {}",
            self.class, self.confidence, self.annotation
        )
    }
}
