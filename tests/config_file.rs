use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use vest_compliance::config::{ComplianceConfig, ConfigOverrides};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_config_from_file_and_cli_overrides() {
    let file = write_config(
        r#"
        [models]
        person_model_path = "models/people.onnx"
        vest_model_path = "models/vests.onnx"
        vest_classes_path = "models/vests.txt"
        vest_class_id = 0
        input_width = 1280
        input_height = 1280

        [thresholds]
        person_confidence = 0.6
        containment = 0.7

        [images]
        dir = "site/cam1"
        extensions = ["JPG", ".png"]
        sample_size = 0
        shuffle = false

        [output]
        dir = "annotated"
        max_display_height = 1080
        "#,
    );
    let overrides = ConfigOverrides {
        vest_confidence: Some(0.35),
        containment_threshold: Some(0.55),
        images_dir: Some(PathBuf::from("site/cam2")),
        ..ConfigOverrides::default()
    };

    let cfg = ComplianceConfig::load(Some(file.path()), &overrides).expect("load config");

    assert_eq!(cfg.models.person_model_path, PathBuf::from("models/people.onnx"));
    assert_eq!(cfg.models.vest_model_path, PathBuf::from("models/vests.onnx"));
    assert_eq!(cfg.models.vest_classes_path, Some(PathBuf::from("models/vests.txt")));
    assert_eq!(cfg.models.person_classes_path, None);
    assert_eq!(cfg.models.person_class_id, 0);
    assert_eq!(cfg.models.vest_class_id, 0);
    assert_eq!((cfg.models.input_width, cfg.models.input_height), (1280, 1280));
    assert_eq!(cfg.thresholds.person_confidence, 0.6);
    assert_eq!(cfg.thresholds.vest_confidence, 0.35);
    assert_eq!(cfg.thresholds.containment, 0.55);
    assert_eq!(cfg.images.dir, PathBuf::from("site/cam2"));
    assert_eq!(cfg.images.extensions, vec!["jpg".to_string(), "png".to_string()]);
    assert_eq!(cfg.images.sample_size, 0);
    assert!(!cfg.images.shuffle);
    assert_eq!(cfg.output.dir, Some(PathBuf::from("annotated")));
    assert_eq!(cfg.output.max_display_height, 1080);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let file = write_config("[thresholds]\nvest_confidence = 0.45\n");
    let cfg = ComplianceConfig::load(Some(file.path()), &ConfigOverrides::default())
        .expect("load config");

    let defaults = ComplianceConfig::default();
    assert_eq!(cfg.thresholds.vest_confidence, 0.45);
    assert_eq!(cfg.thresholds.person_confidence, defaults.thresholds.person_confidence);
    assert_eq!(cfg.models, defaults.models);
    assert_eq!(cfg.images, defaults.images);
    assert_eq!(cfg.output, defaults.output);
}

#[test]
fn rejects_out_of_range_values() {
    let file = write_config("[thresholds]\ncontainment = 1.0\n");
    assert!(ComplianceConfig::load(Some(file.path()), &ConfigOverrides::default()).is_err());

    let file = write_config("[thresholds]\nperson_confidence = 1.2\n");
    assert!(ComplianceConfig::load(Some(file.path()), &ConfigOverrides::default()).is_err());

    let file = write_config("[output]\nmax_display_height = 0\n");
    assert!(ComplianceConfig::load(Some(file.path()), &ConfigOverrides::default()).is_err());

    let file = write_config("[images]\nextensions = []\n");
    assert!(ComplianceConfig::load(Some(file.path()), &ConfigOverrides::default()).is_err());
}

#[test]
fn reports_malformed_and_missing_files() {
    let file = write_config("[thresholds\ncontainment = 0.5\n");
    let err = ComplianceConfig::load(Some(file.path()), &ConfigOverrides::default())
        .expect_err("malformed toml");
    assert!(err.to_string().contains("invalid config file"));

    let err = ComplianceConfig::load(
        Some(std::path::Path::new("does/not/exist.toml")),
        &ConfigOverrides::default(),
    )
    .expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn no_shuffle_and_seed_overrides() {
    let overrides = ConfigOverrides {
        no_shuffle: true,
        seed: Some(42),
        sample_size: Some(10),
        ..ConfigOverrides::default()
    };
    let cfg = ComplianceConfig::load(None, &overrides).expect("load config");
    assert!(!cfg.images.shuffle);
    assert_eq!(cfg.images.seed, Some(42));
    assert_eq!(cfg.images.sample_size, 10);
}
