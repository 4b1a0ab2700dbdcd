use image::DynamicImage;
use shelfscan_core::BarcodeCandidate;

use crate::engine::BarcodeEngine;

/// A successful decode, tagged with the fallback strategy that produced it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub candidate: BarcodeCandidate,
    pub strategy: &'static str,
}

/// Attempt decoding raw image bytes through a fixed fallback order until one
/// strategy succeeds or all fail: as-is, grayscale, contrast, sharpen, blur,
/// brighten, small rotations, scaling, center-crop, then adaptive threshold
/// and morphology when the `imageproc` feature is compiled in.
///
/// Bytes that are not a decodable image count as a miss, not an error; the
/// caller surfaces it as a not-found row like any other decode failure.
pub fn decode_barcode(engine: &dyn BarcodeEngine, data: &[u8]) -> Option<Decoded> {
    let original = match image::load_from_memory(data) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!("undecodable image bytes: {e}");
            return None;
        }
    };

    if let Some(hit) = attempt(engine, "as-is", &original) {
        return Some(hit);
    }
    if let Some(hit) = attempt(engine, "grayscale", &original.grayscale()) {
        return Some(hit);
    }
    if let Some(hit) = attempt(engine, "contrast", &original.adjust_contrast(25.0)) {
        return Some(hit);
    }
    if let Some(hit) = attempt(engine, "sharpen", &original.unsharpen(1.0, 4)) {
        return Some(hit);
    }
    if let Some(hit) = attempt(engine, "blur", &original.blur(0.5)) {
        return Some(hit);
    }
    if let Some(hit) = attempt(engine, "brighten", &original.brighten(30)) {
        return Some(hit);
    }

    // Cylindrical packaging often leaves the code a few degrees off-axis.
    #[cfg(feature = "imageproc")]
    for angle in (-10i32..=10).step_by(2) {
        if angle == 0 {
            continue;
        }
        if let Some(hit) = attempt(engine, "rotate", &rotate(&original, angle as f32)) {
            tracing::debug!(angle, "decoded after rotation");
            return Some(hit);
        }
    }

    for scale in [0.8f32, 1.2, 1.5] {
        let w = ((original.width() as f32 * scale) as u32).max(1);
        let h = ((original.height() as f32 * scale) as u32).max(1);
        let scaled = original.resize_exact(w, h, image::imageops::FilterType::Lanczos3);
        if let Some(hit) = attempt(engine, "scale", &scaled) {
            tracing::debug!(scale, "decoded after scaling");
            return Some(hit);
        }
    }

    if let Some(hit) = attempt(engine, "center-crop", &center_crop(&original)) {
        return Some(hit);
    }

    #[cfg(feature = "imageproc")]
    {
        let gray = original.to_luma8();
        let thresholded = imageproc::contrast::adaptive_threshold(&gray, 5);
        if let Some(hit) =
            attempt(engine, "adaptive-threshold", &DynamicImage::ImageLuma8(thresholded))
        {
            return Some(hit);
        }

        let closed =
            imageproc::morphology::close(&gray, imageproc::distance_transform::Norm::LInf, 1);
        if let Some(hit) = attempt(engine, "morphology", &DynamicImage::ImageLuma8(closed)) {
            return Some(hit);
        }
    }

    tracing::debug!("all decode strategies exhausted");
    None
}

fn attempt(engine: &dyn BarcodeEngine, strategy: &'static str, img: &DynamicImage) -> Option<Decoded> {
    let candidate = engine.decode(img)?;
    tracing::debug!(strategy, value = %candidate.value, "barcode decoded");
    Some(Decoded { candidate, strategy })
}

/// Keep the middle 80% of each axis.
fn center_crop(img: &DynamicImage) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    let margin_w = w / 10;
    let margin_h = h / 10;
    if w <= 2 * margin_w || h <= 2 * margin_h {
        return img.clone();
    }
    img.crop_imm(margin_w, margin_h, w - 2 * margin_w, h - 2 * margin_h)
}

#[cfg(feature = "imageproc")]
fn rotate(img: &DynamicImage, degrees: f32) -> DynamicImage {
    use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
    let gray = img.to_luma8();
    let rotated =
        rotate_about_center(&gray, degrees.to_radians(), Interpolation::Bilinear, image::Luma([255u8]));
    DynamicImage::ImageLuma8(rotated)
}
