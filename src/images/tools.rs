use std::io::Write;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tempfile::NamedTempFile;

use crate::thumbnailer::{ThumbnailError, ThumbnailResult};

const JPEG_QUALITY: u8 = 85;

/// Size that fits `source` into `bounds` keeping the aspect ratio.
///
/// A zero bound leaves that axis unconstrained. Images already inside the
/// box are never upscaled.
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return source;
    }

    let scale_w = if max_w == 0 {
        f64::INFINITY
    } else {
        max_w as f64 / src_w as f64
    };
    let scale_h = if max_h == 0 {
        f64::INFINITY
    } else {
        max_h as f64 / src_h as f64
    };
    let scale = scale_w.min(scale_h).min(1.0);

    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Size that covers `target` completely keeping the aspect ratio; one side
/// matches, the other overflows and gets cropped.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (u64::from(source.0), u64::from(source.1));
    let (tgt_w, tgt_h) = (u64::from(target.0), u64::from(target.1));

    if src_w == 0 || src_h == 0 {
        return target;
    }

    // Compare tgt_w / src_w against tgt_h / src_h without floats
    let (w, h) = if tgt_w * src_h >= tgt_h * src_w {
        (tgt_w, (src_h * tgt_w).div_ceil(src_w))
    } else {
        ((src_w * tgt_h).div_ceil(src_h), tgt_h)
    };

    (
        u32::try_from(w).unwrap_or(u32::MAX),
        u32::try_from(h).unwrap_or(u32::MAX),
    )
}

// Decode, resize and encode as JPEG
pub fn convert_image(
    image_data: &[u8],
    max_width: u32,
    max_height: u32,
    crop: bool,
) -> ThumbnailResult<Vec<u8>> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| ThumbnailError::NotAnImage(format!("Failed to load image: {}", e)))?;

    let processed = if crop {
        fill_and_crop(img, max_width, max_height)?
    } else {
        fit_image(img, max_width, max_height)
    };

    encode_jpeg(&processed)
}

/// Resize `image_data` into the `max_width` x `max_height` box and write the
/// result at `dest`. The file only appears once it is complete.
pub fn render_thumbnail(
    image_data: &[u8],
    dest: &Path,
    max_width: u32,
    max_height: u32,
    crop: bool,
) -> ThumbnailResult<()> {
    let output = convert_image(image_data, max_width, max_height, crop)?;

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&output)?;
    tmp.persist(dest).map_err(|e| ThumbnailError::IoError(e.error))?;

    log::debug!("Thumbnail written to {}", dest.display());
    Ok(())
}

fn fit_image(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (current_width, current_height) = img.dimensions();
    let (target_width, target_height) =
        calculate_fit_dimensions((current_width, current_height), (max_width, max_height));

    if (target_width, target_height) == (current_width, current_height) {
        return img;
    }

    img.resize_exact(target_width, target_height, FilterType::Lanczos3)
}

fn fill_and_crop(
    img: DynamicImage,
    target_width: u32,
    target_height: u32,
) -> ThumbnailResult<DynamicImage> {
    if target_width == 0 || target_height == 0 {
        return Err(ThumbnailError::ConversionError(
            "Both width and height must be provided for cropping".to_string(),
        ));
    }

    let (scaled_width, scaled_height) =
        calculate_fill_dimensions(img.dimensions(), (target_width, target_height));
    let scaled = img.resize_exact(scaled_width, scaled_height, FilterType::Lanczos3);

    // Crop from the center
    let crop_x = scaled_width.saturating_sub(target_width) / 2;
    let crop_y = scaled_height.saturating_sub(target_height) / 2;

    Ok(scaled.crop_imm(crop_x, crop_y, target_width, target_height))
}

fn encode_jpeg(img: &DynamicImage) -> ThumbnailResult<Vec<u8>> {
    let mut output = Vec::new();
    let rgb = img.to_rgb8();

    let mut encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ThumbnailError::ConversionError(format!("JPEG encoding failed: {}", e)))?;

    Ok(output)
}
