use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vest_compliance::compliance::ComplianceMatcher;
use vest_compliance::config::{ComplianceConfig, ConfigOverrides};
use vest_compliance::detector::load_yolo_detector;
use vest_compliance::pipeline::{ImageSource, Pipeline};
use vest_compliance::presentation::OverlayRenderer;

/// Flags persons that are not wearing a high-visibility vest.
#[derive(Parser, Debug)]
#[command(name = "vest-compliance", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// ONNX model that detects persons
    #[arg(long)]
    person_model: Option<PathBuf>,

    /// ONNX model that detects vests
    #[arg(long)]
    vest_model: Option<PathBuf>,

    /// Directory with the images to check
    #[arg(long)]
    images: Option<PathBuf>,

    /// Write annotated images into this directory
    #[arg(long)]
    output: Option<PathBuf>,

    /// Font used for overlay labels
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long)]
    person_conf: Option<f32>,

    #[arg(long)]
    vest_conf: Option<f32>,

    /// Fraction of a vest box that must lie inside a person box
    #[arg(long)]
    containment: Option<f32>,

    /// How many images to check, 0 for all
    #[arg(long)]
    sample_size: Option<usize>,

    /// Seed for the image shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the directory order instead of shuffling
    #[arg(long, default_value_t = false)]
    no_shuffle: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            person_model_path: self.person_model.clone(),
            vest_model_path: self.vest_model.clone(),
            images_dir: self.images.clone(),
            output_dir: self.output.clone(),
            font_path: self.font.clone(),
            person_confidence: self.person_conf,
            vest_confidence: self.vest_conf,
            containment_threshold: self.containment,
            sample_size: self.sample_size,
            seed: self.seed,
            no_shuffle: self.no_shuffle,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = ComplianceConfig::load(args.config.as_deref(), &args.overrides())?;

    log::info!("--- STARTING VEST COMPLIANCE CHECK ---");
    let detector = load_yolo_detector(&config)?;
    detector.log_classes();

    let source = ImageSource::from_settings(&config.images)?;
    log::info!("{} images will be processed", source.len());

    let mut pipeline = Pipeline::new(
        detector,
        ComplianceMatcher::new(config.thresholds.containment),
    );
    if let Some(output_dir) = &config.output.dir {
        let renderer = OverlayRenderer::from_settings(&config.output)?;
        log::info!("Annotated images will be written to {}", output_dir.display());
        pipeline = pipeline.with_overlay(renderer, output_dir.clone());
    }

    let summary = pipeline.run(source.iter());
    log::info!("{}", summary);
    log::info!("--- PROCESS FINISHED ---");
    Ok(())
}
