use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::{Detection, DetectionClass};
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use crate::image_utils::padding::letterbox;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::object_detection_utils::non_maximum_suppression;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::{ArrayView2, Axis, Ix2};
use ort::inputs;
use ort::value::TensorRef;
use std::path::Path;

/// Number of leading rows in a YOLOv11 detection head that hold cx, cy, w, h.
const BOX_COORDINATES: usize = 4;

pub struct Yolov11BoundingBox {
    ort_session: OrtInferenceSession,
    class_names: Vec<String>,
    input_width: u32,
    input_height: u32,
    nms_iou_threshold: f32,
    model_name: String,
}

impl Yolov11BoundingBox {
    pub fn new(
        model_path: &Path,
        class_names: Vec<String>,
        input_width: u32,
        input_height: u32,
        nms_iou_threshold: f32,
        model_name: String,
    ) -> Result<Self> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(Yolov11BoundingBox {
            ort_session,
            class_names,
            input_width,
            input_height,
            nms_iou_threshold,
            model_name,
        })
    }
}

impl ObjectDetectionModel for Yolov11BoundingBox {
    fn run_inference(&mut self, image: &RgbImage, confidence: f32) -> Result<Vec<Detection>> {
        let boxed = letterbox(image, self.input_width, self.input_height);
        let input_array = convert_rgb_image_to_owned_array(&boxed.image);
        let outputs = self
            .ort_session
            .session
            .run(inputs!["images" => TensorRef::from_array_view(&input_array)?])
            .with_context(|| format!("Inference failed for {}", self.model_name))?;
        let output = outputs["output0"].try_extract_array::<f32>()?;
        // (1, 4 + classes, anchors) -> (4 + classes, anchors)
        let output = output
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()
            .with_context(|| format!("Unexpected output shape from {}", self.model_name))?;
        let detections = decode_predictions(
            output,
            confidence,
            boxed.scale,
            image.width() as f32,
            image.height() as f32,
        );
        Ok(non_maximum_suppression(detections, self.nms_iou_threshold))
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Turns a raw detection head into detections in original image coordinates.
///
/// `predictions` has one column per anchor: cx, cy, w, h followed by one score per class.
/// `scale` is the letterbox factor that was applied to the image before inference.
pub fn decode_predictions(
    predictions: ArrayView2<f32>,
    confidence: f32,
    scale: f32,
    image_width: f32,
    image_height: f32,
) -> Vec<Detection> {
    let mut detections: Vec<Detection> = Vec::new();
    for column in predictions.axis_iter(Axis(1)) {
        let column: Vec<f32> = column.iter().copied().collect();
        let Some((class_id, prob)) = column
            .iter()
            .skip(BOX_COORDINATES)
            .copied()
            .enumerate()
            .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
        else {
            continue;
        };
        if prob < confidence {
            continue;
        }
        let bbox = match BoundingBox::from_center(
            column[0] / scale,
            column[1] / scale,
            column[2] / scale,
            column[3] / scale,
        ) {
            Ok(bbox) => bbox.clamp_to(image_width, image_height),
            Err(e) => {
                log::debug!("Dropping malformed prediction: {}", e);
                continue;
            }
        };
        detections.push(Detection::new(
            bbox,
            prob,
            DetectionClass::Other(class_id),
        ));
    }
    detections
}
