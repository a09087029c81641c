use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::compliance::matcher::ComplianceResult;
use crate::config::OutputSettings;
use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result, anyhow};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

pub const VEST_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const COMPLIANT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const NON_COMPLIANT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const NON_COMPLIANT_LABEL: &str = "NO VEST";
const COMPLIANT_LABEL: &str = "OK";
const LABEL_STRIP_WIDTH: u32 = 160;
const LABEL_STRIP_HEIGHT: u32 = 30;

/// Draws the compliance partition over the source image.
///
/// Vests are outlined in yellow with their confidence, persons without a vest get a thick red
/// box and a filled `NO VEST` strip, persons with a vest a green box marked `OK`. Text is only
/// drawn when a font has been loaded.
pub struct OverlayRenderer {
    font: Option<FontVec>,
    max_display_height: u32,
}

impl OverlayRenderer {
    pub fn new(font: Option<FontVec>, max_display_height: u32) -> Self {
        OverlayRenderer {
            font,
            max_display_height,
        }
    }

    pub fn from_settings(settings: &OutputSettings) -> Result<Self> {
        let font = match &settings.font_path {
            Some(path) => Some(load_font(path)?),
            None => {
                log::info!("No font configured, overlays will have no labels");
                None
            }
        };
        Ok(OverlayRenderer::new(font, settings.max_display_height))
    }

    pub fn render(&self, image: &RgbImage, result: &ComplianceResult) -> RgbImage {
        let mut canvas = image.clone();

        for vest in &result.vest_detections {
            draw_box(&mut canvas, &vest.annotation, VEST_COLOR, 2);
            self.draw_label(
                &mut canvas,
                &format!("Vest: {:.2}", vest.confidence),
                vest.annotation.left() as i32,
                vest.annotation.top() as i32 - 18,
                VEST_COLOR,
                15.0,
            );
        }

        for person in &result.non_compliant_persons {
            draw_box(&mut canvas, person, NON_COMPLIANT_COLOR, 3);
            let (x, y) = (person.left() as i32, person.top() as i32);
            draw_filled_rect_mut(
                &mut canvas,
                Rect::at(x, y - LABEL_STRIP_HEIGHT as i32).of_size(LABEL_STRIP_WIDTH, LABEL_STRIP_HEIGHT),
                NON_COMPLIANT_COLOR,
            );
            self.draw_label(&mut canvas, NON_COMPLIANT_LABEL, x + 5, y - 25, LABEL_TEXT_COLOR, 20.0);
        }

        for person in &result.compliant_persons {
            draw_box(&mut canvas, person, COMPLIANT_COLOR, 2);
            let (x, y) = (person.left() as i32, person.top() as i32);
            self.draw_label(&mut canvas, COMPLIANT_LABEL, x, y - 22, COMPLIANT_COLOR, 20.0);
        }

        // Thin vest outlines on top so they stay visible inside person boxes.
        for vest in &result.vest_detections {
            draw_box(&mut canvas, &vest.annotation, VEST_COLOR, 1);
        }

        self.draw_label(&mut canvas, &result.to_string(), 10, 10, LABEL_TEXT_COLOR, 20.0);

        fit_to_height(canvas, self.max_display_height)
    }

    /// Renders the overlay and writes it next to the others as `<stem>_annotated.png`.
    pub fn save(
        &self,
        image: &RgbImage,
        result: &ComplianceResult,
        source_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let destination = output_dir.join(format!("{}_annotated.png", stem));
        self.render(image, result)
            .save(&destination)
            .with_context(|| format!("Failed to write {}", destination.display()))?;
        Ok(destination)
    }

    fn draw_label(&self, canvas: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>, size: f32) {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, color, x, y, PxScale::from(size), font, text);
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    FontVec::try_from_vec(bytes).map_err(|e| anyhow!("Invalid font {}: {}", path.display(), e))
}

/// Outlines `bbox`, growing outwards by one pixel per unit of thickness.
fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let width = (bbox.width().round() as u32).max(1);
    let height = (bbox.height().round() as u32).max(1);
    for i in 0..thickness {
        let rect = Rect::at(bbox.left() as i32 - i as i32, bbox.top() as i32 - i as i32)
            .of_size(width + 2 * i, height + 2 * i);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Downscales images taller than `max_height`, keeping the aspect ratio.
fn fit_to_height(image: RgbImage, max_height: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if height <= max_height {
        return image;
    }
    let scale = max_height as f32 / height as f32;
    let new_width = ((width as f32 * scale) as u32).max(1);
    imageops::resize(&image, new_width, max_height, FilterType::Triangle)
}
