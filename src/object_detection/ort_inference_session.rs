use anyhow::{Context, Result};
use ort::session::Session;
use std::path::Path;

/// An onnxruntime inference session.
///
/// All of the object detection models in this project are just wrappers
/// around an ONNX inference session that handles running the model on
/// hardware.
pub struct OrtInferenceSession {
    pub session: Session,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!(
                "Model path does not exist, or cannot be read: {}",
                model_path.display()
            );
        }
        let session = Session::builder()?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model {}", model_path.display()))?;
        log::debug!(
            "Loaded {} (inputs: {:?}, outputs: {:?})",
            model_path.display(),
            session.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            session.outputs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>()
        );
        Ok(Self { session })
    }
}
