use anyhow::{Context, Result};
use image::{self, RgbImage};
use std::path::Path;

pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage> {
    let img = image::open(filepath)
        .with_context(|| format!("Failed to read image {}", filepath.display()))?;
    Ok(img.into_rgb8())
}
