use crate::compliance::matcher::{ComplianceMatcher, ComplianceResult};
use crate::config::ImageSourceSettings;
use crate::detector::DetectorAdapter;
use crate::image_utils::image_io::read_image_as_rgb8;
use crate::presentation::OverlayRenderer;
use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The finite list of images a run will look at.
///
/// The list is fixed when the source is built, so `iter` can be called any number of times and
/// always yields the same images in the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSource {
    paths: Vec<PathBuf>,
}

impl ImageSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        ImageSource { paths }
    }

    /// Lists the images directly inside the configured directory, then shuffles and samples.
    pub fn from_settings(settings: &ImageSourceSettings) -> Result<Self> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(&settings.dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), &settings.extensions) {
                paths.push(entry.into_path());
            }
        }
        if paths.is_empty() {
            bail!("No images found in {}", settings.dir.display());
        }
        paths.sort();
        if settings.shuffle {
            let mut rng = match settings.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            paths.shuffle(&mut rng);
        }
        if settings.sample_size > 0 {
            paths.truncate(settings.sample_size);
        }
        Ok(ImageSource::new(paths))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|allowed| *allowed == ext))
}

/// What happened to one image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageReport {
    pub path: PathBuf,
    pub result: ComplianceResult,
    pub overlay_path: Option<PathBuf>,
}

/// Totals over every image of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub images_processed: usize,
    pub images_skipped: usize,
    pub persons: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub vests: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &ComplianceResult) {
        self.images_processed += 1;
        self.persons += result.person_count();
        self.compliant += result.compliant_count();
        self.non_compliant += result.non_compliant_count();
        self.vests += result.vest_count();
    }

    pub fn record_skip(&mut self) {
        self.images_skipped += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images processed, {} skipped | Compliant: {} | Non-compliant: {}",
            self.images_processed, self.images_skipped, self.compliant, self.non_compliant
        )
    }
}

/// Runs detection, matching and (optionally) overlay rendering, one image at a time.
pub struct Pipeline<D: DetectorAdapter> {
    detector: D,
    matcher: ComplianceMatcher,
    overlay: Option<(OverlayRenderer, PathBuf)>,
}

impl<D: DetectorAdapter> Pipeline<D> {
    pub fn new(detector: D, matcher: ComplianceMatcher) -> Self {
        Pipeline {
            detector,
            matcher,
            overlay: None,
        }
    }

    /// Writes an annotated copy of every processed image into `output_dir`.
    pub fn with_overlay(mut self, renderer: OverlayRenderer, output_dir: PathBuf) -> Self {
        self.overlay = Some((renderer, output_dir));
        self
    }

    pub fn process_image(&mut self, path: &Path) -> Result<ImageReport> {
        let image = read_image_as_rgb8(path)?;
        let detections = self.detector.detect(&image)?;
        log::info!("  Persons detected: {}", detections.persons.len());
        log::info!("  Vests detected: {}", detections.vests.len());

        let result = self.matcher.evaluate(&detections.persons, &detections.vests);
        log::info!("  [RESULT] {}", result);

        let overlay_path = match &self.overlay {
            Some((renderer, output_dir)) => {
                match renderer.save(&image, &result, path, output_dir) {
                    Ok(written) => {
                        log::debug!("  Overlay written to {}", written.display());
                        Some(written)
                    }
                    Err(e) => {
                        log::warn!("  Could not write overlay: {:#}", e);
                        None
                    }
                }
            }
            None => None,
        };

        Ok(ImageReport {
            path: path.to_path_buf(),
            result,
            overlay_path,
        })
    }

    /// Processes each image in turn. A failing image is logged and skipped.
    pub fn run<I, P>(&mut self, images: I) -> RunSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut summary = RunSummary::default();
        for path in images {
            let path = path.as_ref();
            log::info!(
                "--> Processing: {}",
                path.file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_else(|| path.to_string_lossy())
            );
            match self.process_image(path) {
                Ok(report) => summary.record(&report.result),
                Err(e) => {
                    log::warn!("  Skipping {}: {:#}", path.display(), e);
                    summary.record_skip();
                }
            }
        }
        summary
    }
}
