use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_PERSON_MODEL_PATH: &str = "modelos/yolo11n.onnx";
const DEFAULT_VEST_MODEL_PATH: &str = "modelos/yolo11s_train_v2.onnx";
const DEFAULT_PERSON_CLASS_ID: usize = 0;
const DEFAULT_VEST_CLASS_ID: usize = 1;
const DEFAULT_INPUT_SIZE: u32 = 640;
const DEFAULT_NMS_IOU_THRESHOLD: f32 = 0.45;
const DEFAULT_PERSON_CONFIDENCE: f32 = 0.4;
const DEFAULT_VEST_CONFIDENCE: f32 = 0.5;
const DEFAULT_CONTAINMENT_THRESHOLD: f32 = crate::compliance::matcher::DEFAULT_CONTAINMENT_THRESHOLD;
const DEFAULT_IMAGES_DIR: &str = "dataset/test/images";
const DEFAULT_EXTENSION: &str = "jpg";
const DEFAULT_SAMPLE_SIZE: usize = 5;
const DEFAULT_MAX_DISPLAY_HEIGHT: u32 = 800;

#[derive(Debug, Deserialize, Default)]
struct ComplianceConfigFile {
    models: Option<ModelsConfigFile>,
    thresholds: Option<ThresholdsConfigFile>,
    images: Option<ImagesConfigFile>,
    output: Option<OutputConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelsConfigFile {
    person_model_path: Option<PathBuf>,
    vest_model_path: Option<PathBuf>,
    person_classes_path: Option<PathBuf>,
    vest_classes_path: Option<PathBuf>,
    person_class_id: Option<usize>,
    vest_class_id: Option<usize>,
    input_width: Option<u32>,
    input_height: Option<u32>,
    nms_iou_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct ThresholdsConfigFile {
    person_confidence: Option<f32>,
    vest_confidence: Option<f32>,
    containment: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct ImagesConfigFile {
    dir: Option<PathBuf>,
    extensions: Option<Vec<String>>,
    sample_size: Option<usize>,
    shuffle: Option<bool>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputConfigFile {
    dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
    max_display_height: Option<u32>,
}

/// Immutable settings for a whole run, handed to each component at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceConfig {
    pub models: ModelSettings,
    pub thresholds: ThresholdSettings,
    pub images: ImageSourceSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub person_model_path: PathBuf,
    pub vest_model_path: PathBuf,
    pub person_classes_path: Option<PathBuf>,
    pub vest_classes_path: Option<PathBuf>,
    pub person_class_id: usize,
    pub vest_class_id: usize,
    pub input_width: u32,
    pub input_height: u32,
    pub nms_iou_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSettings {
    pub person_confidence: f32,
    pub vest_confidence: f32,
    pub containment: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSourceSettings {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
    /// Zero means every image found.
    pub sample_size: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub max_display_height: u32,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub person_model_path: Option<PathBuf>,
    pub vest_model_path: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub person_confidence: Option<f32>,
    pub vest_confidence: Option<f32>,
    pub containment_threshold: Option<f32>,
    pub sample_size: Option<usize>,
    pub seed: Option<u64>,
    pub no_shuffle: bool,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self::from_file(ComplianceConfigFile::default())
    }
}

impl ComplianceConfig {
    /// Builds the configuration from defaults, an optional TOML file and command line overrides.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file_cfg = match config_path {
            Some(path) => read_config_file(path)?,
            None => ComplianceConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ComplianceConfigFile) -> Self {
        let models = file.models.unwrap_or_default();
        let thresholds = file.thresholds.unwrap_or_default();
        let images = file.images.unwrap_or_default();
        let output = file.output.unwrap_or_default();
        Self {
            models: ModelSettings {
                person_model_path: models
                    .person_model_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PERSON_MODEL_PATH)),
                vest_model_path: models
                    .vest_model_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_VEST_MODEL_PATH)),
                person_classes_path: models.person_classes_path,
                vest_classes_path: models.vest_classes_path,
                person_class_id: models.person_class_id.unwrap_or(DEFAULT_PERSON_CLASS_ID),
                vest_class_id: models.vest_class_id.unwrap_or(DEFAULT_VEST_CLASS_ID),
                input_width: models.input_width.unwrap_or(DEFAULT_INPUT_SIZE),
                input_height: models.input_height.unwrap_or(DEFAULT_INPUT_SIZE),
                nms_iou_threshold: models
                    .nms_iou_threshold
                    .unwrap_or(DEFAULT_NMS_IOU_THRESHOLD),
            },
            thresholds: ThresholdSettings {
                person_confidence: thresholds
                    .person_confidence
                    .unwrap_or(DEFAULT_PERSON_CONFIDENCE),
                vest_confidence: thresholds.vest_confidence.unwrap_or(DEFAULT_VEST_CONFIDENCE),
                containment: thresholds
                    .containment
                    .unwrap_or(DEFAULT_CONTAINMENT_THRESHOLD),
            },
            images: ImageSourceSettings {
                dir: images
                    .dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR)),
                extensions: images
                    .extensions
                    .map(|exts| normalize_extensions(&exts))
                    .unwrap_or_else(|| vec![DEFAULT_EXTENSION.to_string()]),
                sample_size: images.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE),
                shuffle: images.shuffle.unwrap_or(true),
                seed: images.seed,
            },
            output: OutputSettings {
                dir: output.dir,
                font_path: output.font_path,
                max_display_height: output
                    .max_display_height
                    .unwrap_or(DEFAULT_MAX_DISPLAY_HEIGHT),
            },
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.person_model_path {
            self.models.person_model_path = path.clone();
        }
        if let Some(path) = &overrides.vest_model_path {
            self.models.vest_model_path = path.clone();
        }
        if let Some(dir) = &overrides.images_dir {
            self.images.dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output.dir = Some(dir.clone());
        }
        if let Some(path) = &overrides.font_path {
            self.output.font_path = Some(path.clone());
        }
        if let Some(conf) = overrides.person_confidence {
            self.thresholds.person_confidence = conf;
        }
        if let Some(conf) = overrides.vest_confidence {
            self.thresholds.vest_confidence = conf;
        }
        if let Some(threshold) = overrides.containment_threshold {
            self.thresholds.containment = threshold;
        }
        if let Some(sample_size) = overrides.sample_size {
            self.images.sample_size = sample_size;
        }
        if overrides.seed.is_some() {
            self.images.seed = overrides.seed;
        }
        if overrides.no_shuffle {
            self.images.shuffle = false;
        }
    }

    fn validate(&self) -> Result<()> {
        validate_unit_interval("person confidence threshold", self.thresholds.person_confidence)?;
        validate_unit_interval("vest confidence threshold", self.thresholds.vest_confidence)?;
        validate_unit_interval("nms iou threshold", self.models.nms_iou_threshold)?;
        let containment = self.thresholds.containment;
        if !(containment > 0.0 && containment < 1.0) {
            return Err(anyhow!(
                "containment threshold must be strictly between 0 and 1, got {}",
                containment
            ));
        }
        if self.models.input_width == 0 || self.models.input_height == 0 {
            return Err(anyhow!("model input size must be greater than zero"));
        }
        if self.output.max_display_height == 0 {
            return Err(anyhow!("max display height must be greater than zero"));
        }
        if self.images.extensions.is_empty() {
            return Err(anyhow!("at least one image extension is required"));
        }
        Ok(())
    }
}

fn validate_unit_interval(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(anyhow!("{} must be within [0, 1], got {}", name, value));
    }
    Ok(())
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn read_config_file(path: &Path) -> Result<ComplianceConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_deployment_values() {
        let cfg = ComplianceConfig::default();
        assert_eq!(cfg.thresholds.person_confidence, 0.4);
        assert_eq!(cfg.thresholds.vest_confidence, 0.5);
        assert_eq!(cfg.thresholds.containment, 0.5);
        assert_eq!(cfg.models.person_class_id, 0);
        assert_eq!(cfg.models.vest_class_id, 1);
        assert_eq!(cfg.images.sample_size, 5);
        assert_eq!(cfg.images.extensions, vec!["jpg".to_string()]);
        assert!(cfg.images.shuffle);
        assert!(cfg.output.dir.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn extensions_are_normalized() {
        assert_eq!(
            normalize_extensions(&[".JPG".into(), " png ".into(), "".into()]),
            vec!["jpg".to_string(), "png".to_string()]
        );
    }

    #[test]
    fn containment_threshold_must_be_open_interval() {
        for bad in [0.0, 1.0, -0.1, 1.5, f32::NAN] {
            let overrides = ConfigOverrides {
                containment_threshold: Some(bad),
                ..ConfigOverrides::default()
            };
            assert!(ComplianceConfig::load(None, &overrides).is_err(), "{}", bad);
        }
    }

    #[test]
    fn confidence_thresholds_may_touch_bounds() {
        let overrides = ConfigOverrides {
            person_confidence: Some(0.0),
            vest_confidence: Some(1.0),
            ..ConfigOverrides::default()
        };
        assert!(ComplianceConfig::load(None, &overrides).is_ok());
    }
}
