use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Gray used by Ultralytics for letterbox padding.
pub const LETTERBOX_FILL: Rgb<u8> = Rgb([114, 114, 114]);

/// An image resized to fit a model input, along with the scale that was applied.
pub struct Letterboxed {
    pub image: RgbImage,
    pub scale: f32,
}

/// Pads an rgb8 image by adding pixels to the right and bottom of the image.
pub fn pad_right_bottom_img_rbg8(
    original_image: &RgbImage,
    new_width: u32,
    new_height: u32,
    fill: Rgb<u8>,
) -> RgbImage {
    let mut padded_image: RgbImage = RgbImage::from_pixel(new_width, new_height, fill);
    imageops::replace(&mut padded_image, original_image, 0, 0);
    padded_image
}

/// Resizes an image to fit inside `target_width` x `target_height` without changing its aspect
/// ratio, then pads the right and bottom with gray.
///
/// Because the image stays anchored at the origin, model coordinates map back to the original
/// image by dividing by `scale`.
pub fn letterbox(original_image: &RgbImage, target_width: u32, target_height: u32) -> Letterboxed {
    let (width, height) = original_image.dimensions();
    let scale = (target_width as f32 / width as f32).min(target_height as f32 / height as f32);
    let new_width = ((width as f32 * scale).round() as u32).clamp(1, target_width);
    let new_height = ((height as f32 * scale).round() as u32).clamp(1, target_height);
    let resized = if (new_width, new_height) == (width, height) {
        original_image.clone()
    } else {
        imageops::resize(original_image, new_width, new_height, FilterType::Triangle)
    };
    Letterboxed {
        image: pad_right_bottom_img_rbg8(&resized, target_width, target_height, LETTERBOX_FILL),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_keeps_original_pixels() {
        let original = RgbImage::from_pixel(2, 2, Rgb([10, 20, 30]));
        let padded = pad_right_bottom_img_rbg8(&original, 4, 3, LETTERBOX_FILL);
        assert_eq!(padded.dimensions(), (4, 3));
        assert_eq!(padded.get_pixel(1, 1), &Rgb([10, 20, 30]));
        assert_eq!(padded.get_pixel(3, 0), &LETTERBOX_FILL);
        assert_eq!(padded.get_pixel(0, 2), &LETTERBOX_FILL);
    }

    #[test]
    fn letterbox_wide_image() {
        let original = RgbImage::from_pixel(1280, 640, Rgb([200, 0, 0]));
        let boxed = letterbox(&original, 640, 640);
        assert_eq!(boxed.scale, 0.5);
        assert_eq!(boxed.image.dimensions(), (640, 640));
        assert_eq!(boxed.image.get_pixel(639, 319), &Rgb([200, 0, 0]));
        assert_eq!(boxed.image.get_pixel(0, 320), &LETTERBOX_FILL);
    }

    #[test]
    fn letterbox_exact_fit_is_unscaled() {
        let original = RgbImage::from_pixel(640, 640, Rgb([1, 2, 3]));
        let boxed = letterbox(&original, 640, 640);
        assert_eq!(boxed.scale, 1.0);
        assert_eq!(boxed.image, original);
    }
}
