use crate::annotations::detection::Detection;
use anyhow::Result;
use image::RgbImage;

/// Defines a trait that all object detection models must follow.
pub trait ObjectDetectionModel {
    /// Runs the model on a whole image.
    ///
    /// Returned boxes are in the pixel coordinates of `image`, tagged with
    /// `DetectionClass::Other(class_id)` where `class_id` is the model's raw class index.
    /// Detections below `confidence` are already dropped.
    fn run_inference(&mut self, image: &RgbImage, confidence: f32) -> Result<Vec<Detection>>;

    /// Human readable names for the model's class indices. May be empty.
    fn class_names(&self) -> &[String];

    fn model_name(&self) -> &str;
}
