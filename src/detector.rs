use crate::annotations::detection::{Detection, DetectionClass};
use crate::config::ComplianceConfig;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::object_detection_utils::read_classes_txt_file;
use crate::object_detection::yolov11_bounding_box::Yolov11BoundingBox;
use anyhow::Result;
use image::RgbImage;
use std::path::Path;

/// Person and vest detections found in one image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageDetections {
    pub persons: Vec<Detection>,
    pub vests: Vec<Detection>,
}

/// Anything that can turn an image into person and vest detections.
pub trait DetectorAdapter {
    fn detect(&mut self, image: &RgbImage) -> Result<ImageDetections>;
}

/// Which raw class to keep from a model, and how confident it must be.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassFilter {
    pub class_id: usize,
    pub confidence: f32,
}

/// Runs a person model and a vest model on the same image.
///
/// Each model is filtered to a single target class and its own confidence floor, and the
/// surviving detections are tagged as persons or vests.
pub struct PpeDetector<P: ObjectDetectionModel, V: ObjectDetectionModel> {
    person_model: P,
    vest_model: V,
    person_filter: ClassFilter,
    vest_filter: ClassFilter,
}

impl<P: ObjectDetectionModel, V: ObjectDetectionModel> PpeDetector<P, V> {
    pub fn new(
        person_model: P,
        vest_model: V,
        person_filter: ClassFilter,
        vest_filter: ClassFilter,
    ) -> Self {
        PpeDetector {
            person_model,
            vest_model,
            person_filter,
            vest_filter,
        }
    }

    /// Logs the class names each model knows about and which one is kept.
    pub fn log_classes(&self) {
        log_model_classes(&self.person_model, self.person_filter);
        log_model_classes(&self.vest_model, self.vest_filter);
    }
}

impl<P: ObjectDetectionModel, V: ObjectDetectionModel> DetectorAdapter for PpeDetector<P, V> {
    fn detect(&mut self, image: &RgbImage) -> Result<ImageDetections> {
        let persons = filter_class(
            self.person_model
                .run_inference(image, self.person_filter.confidence)?,
            self.person_filter,
            DetectionClass::Person,
        );
        let vests = filter_class(
            self.vest_model
                .run_inference(image, self.vest_filter.confidence)?,
            self.vest_filter,
            DetectionClass::Vest,
        );
        for detection in persons.iter().chain(vests.iter()) {
            log::debug!("{}", detection);
        }
        Ok(ImageDetections { persons, vests })
    }
}

fn filter_class(
    detections: Vec<Detection>,
    filter: ClassFilter,
    class: DetectionClass,
) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| d.class == DetectionClass::Other(filter.class_id))
        .filter(|d| d.confidence >= filter.confidence)
        .map(|d| Detection { class, ..d })
        .collect()
}

fn log_model_classes(model: &impl ObjectDetectionModel, filter: ClassFilter) {
    let names = model.class_names();
    let target = names
        .get(filter.class_id)
        .cloned()
        .unwrap_or_else(|| filter.class_id.to_string());
    if names.is_empty() {
        log::info!("{}: no class names loaded", model.model_name());
    } else {
        log::info!("{} classes: {:?}", model.model_name(), names);
    }
    log::info!(
        "{}: keeping class {} at confidence >= {}",
        model.model_name(),
        target,
        filter.confidence
    );
}

fn load_class_names(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => read_classes_txt_file(path),
        None => Ok(Vec::new()),
    }
}

/// Loads both ONNX models named in the configuration.
pub fn load_yolo_detector(
    config: &ComplianceConfig,
) -> Result<PpeDetector<Yolov11BoundingBox, Yolov11BoundingBox>> {
    let models = &config.models;
    log::info!("Loading person model: {}", models.person_model_path.display());
    let person_model = Yolov11BoundingBox::new(
        &models.person_model_path,
        load_class_names(models.person_classes_path.as_deref())?,
        models.input_width,
        models.input_height,
        models.nms_iou_threshold,
        "person model".to_string(),
    )?;
    log::info!("Loading vest model: {}", models.vest_model_path.display());
    let vest_model = Yolov11BoundingBox::new(
        &models.vest_model_path,
        load_class_names(models.vest_classes_path.as_deref())?,
        models.input_width,
        models.input_height,
        models.nms_iou_threshold,
        "vest model".to_string(),
    )?;
    Ok(PpeDetector::new(
        person_model,
        vest_model,
        ClassFilter {
            class_id: models.person_class_id,
            confidence: config.thresholds.person_confidence,
        },
        ClassFilter {
            class_id: models.vest_class_id,
            confidence: config.thresholds.vest_confidence,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;

    /// A model that returns canned detections regardless of the image.
    struct StubModel {
        detections: Vec<Detection>,
        class_names: Vec<String>,
    }

    impl StubModel {
        fn new(detections: Vec<Detection>) -> Self {
            StubModel {
                detections,
                class_names: Vec::new(),
            }
        }
    }

    impl ObjectDetectionModel for StubModel {
        fn run_inference(&mut self, _image: &RgbImage, confidence: f32) -> Result<Vec<Detection>> {
            Ok(self
                .detections
                .iter()
                .filter(|d| d.confidence >= confidence)
                .copied()
                .collect())
        }

        fn class_names(&self) -> &[String] {
            &self.class_names
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn raw(left: f32, top: f32, right: f32, bottom: f32, class_id: usize, confidence: f32) -> Detection {
        Detection::new(
            BoundingBox::new(left, top, right, bottom).unwrap(),
            confidence,
            DetectionClass::Other(class_id),
        )
    }

    #[test]
    fn keeps_only_target_classes_and_tags_them() {
        let person_model = StubModel::new(vec![
            raw(0.0, 0.0, 100.0, 200.0, 0, 0.9),
            raw(300.0, 0.0, 400.0, 100.0, 2, 0.95),
            raw(500.0, 0.0, 600.0, 200.0, 0, 0.3),
        ]);
        let vest_model = StubModel::new(vec![
            raw(10.0, 50.0, 90.0, 120.0, 1, 0.8),
            raw(10.0, 50.0, 90.0, 120.0, 0, 0.9),
            raw(510.0, 50.0, 590.0, 120.0, 1, 0.45),
        ]);
        let mut detector = PpeDetector::new(
            person_model,
            vest_model,
            ClassFilter { class_id: 0, confidence: 0.4 },
            ClassFilter { class_id: 1, confidence: 0.5 },
        );

        let detections = detector.detect(&RgbImage::new(640, 480)).unwrap();

        assert_eq!(detections.persons.len(), 1);
        assert_eq!(detections.persons[0].class, DetectionClass::Person);
        assert_eq!(detections.persons[0].confidence, 0.9);
        assert_eq!(detections.vests.len(), 1);
        assert_eq!(detections.vests[0].class, DetectionClass::Vest);
        assert_eq!(detections.vests[0].confidence, 0.8);
    }

    #[test]
    fn empty_models_yield_empty_detections() {
        let mut detector = PpeDetector::new(
            StubModel::new(vec![]),
            StubModel::new(vec![]),
            ClassFilter { class_id: 0, confidence: 0.4 },
            ClassFilter { class_id: 1, confidence: 0.5 },
        );
        assert_eq!(
            detector.detect(&RgbImage::new(8, 8)).unwrap(),
            ImageDetections::default()
        );
    }

    #[test]
    fn missing_classes_file_is_an_error() {
        assert!(load_class_names(Some(Path::new("does/not/exist.txt"))).is_err());
        assert!(load_class_names(None).unwrap().is_empty());
    }
}
