mod tools;

pub use tools::{calculate_fill_dimensions, calculate_fit_dimensions, convert_image, render_thumbnail};

// No GIF
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

pub fn has_image_extension(extension: &str) -> bool {
    let extension = extension.trim().to_lowercase();
    IMAGE_EXTENSIONS.contains(&extension.as_str())
}

// Detect the image type from the file signature (magic numbers)
pub fn detect_image_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if data.starts_with(&[0x47, 0x49, 0x46, 0x38]) {
        Some("image/gif")
    } else if data.starts_with(&[0x52, 0x49, 0x46, 0x46])
        && data.get(8..12) == Some(&[0x57, 0x45, 0x42, 0x50])
    {
        Some("image/webp")
    } else if data.starts_with(&[0x42, 0x4D]) {
        Some("image/bmp")
    } else if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
        || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        Some("image/tiff")
    } else if data.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        Some("image/x-icon")
    } else {
        None
    }
}

pub fn looks_like_image(data: &[u8]) -> bool {
    detect_image_type(data).is_some()
}
