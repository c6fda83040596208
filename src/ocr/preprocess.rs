use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;

use crate::log;

/// JPEG quality used when a screenshot has to be re-encoded.
const JPEG_QUALITY: u8 = 85;

/// Images are not shrunk below this length on their longest side; text
/// becomes unreadable for the OCR service past that point.
const MIN_LONG_SIDE: u32 = 320;

/// Image bytes ready for upload.
#[derive(Debug, Clone)]
pub struct UploadImage {
    /// File name sent with the multipart part
    pub file_name: String,
    /// Encoded image data
    pub bytes: Vec<u8>,
}

/// Reads an image file and makes sure it fits into `max_bytes`.
///
/// Files within the limit are uploaded untouched. Larger files are decoded,
/// their longest side is halved until a JPEG encoding fits, and the result is
/// sent as `<stem>.jpg`. A limit of 0 disables the check.
pub fn prepare_upload(path: &Path, max_bytes: u64) -> Result<UploadImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image.png".to_string());

    if max_bytes == 0 || bytes.len() as u64 <= max_bytes {
        return Ok(UploadImage { file_name, bytes });
    }

    let original_len = bytes.len();
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let encoded = shrink_to_fit(img, max_bytes)?;

    log(&format!(
        "Image {} re-encoded for upload: {} -> {} bytes",
        path.display(),
        original_len,
        encoded.len()
    ));

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    Ok(UploadImage {
        file_name: format!("{}.jpg", stem),
        bytes: encoded,
    })
}

/// Encodes `img` as JPEG, halving the longest side until it fits or the
/// image reaches [`MIN_LONG_SIDE`]. Returns the last encoding either way.
fn shrink_to_fit(img: DynamicImage, max_bytes: u64) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let mut current = DynamicImage::ImageRgb8(img.to_rgb8());

    loop {
        let encoded = encode_jpeg(&current)?;
        let long_side = current.width().max(current.height());
        if encoded.len() as u64 <= max_bytes || long_side / 2 < MIN_LONG_SIDE {
            return Ok(encoded);
        }

        current = current.resize(
            (current.width() / 2).max(1),
            (current.height() / 2).max(1),
            image::imageops::FilterType::Triangle,
        );
    }
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .context("Failed to encode JPEG")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    fn noisy_image(width: u32, height: u32) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
        // Hashed pixels so neither PNG nor JPEG can compress them much
        ImageBuffer::from_fn(width, height, |x, y| {
            let mut h = x.wrapping_mul(73856093) ^ y.wrapping_mul(19349663);
            h ^= h >> 13;
            h = h.wrapping_mul(0x5bd1e995);
            h ^= h >> 15;
            Rgba([h as u8, (h >> 8) as u8, (h >> 16) as u8, 255])
        })
    }

    #[test]
    fn test_small_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("echo.png");
        noisy_image(16, 16).save(&path).unwrap();
        let original = std::fs::read(&path).unwrap();

        let upload = prepare_upload(&path, 1024 * 1024).unwrap();
        assert_eq!(upload.file_name, "echo.png");
        assert_eq!(upload.bytes, original);
    }

    #[test]
    fn test_limit_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("echo.png");
        noisy_image(64, 64).save(&path).unwrap();

        let upload = prepare_upload(&path, 0).unwrap();
        assert_eq!(upload.file_name, "echo.png");
    }

    #[test]
    fn test_large_image_shrunk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("screenshot.png");
        noisy_image(1600, 1200).save(&path).unwrap();
        let original_len = std::fs::metadata(&path).unwrap().len();
        let limit = 1024 * 1024;
        assert!(original_len > limit);

        let upload = prepare_upload(&path, limit).unwrap();
        assert_eq!(upload.file_name, "screenshot.jpg");
        assert!(upload.bytes.len() as u64 <= limit);

        let decoded = image::load_from_memory(&upload.bytes).unwrap();
        assert!(decoded.width() < 1600);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(prepare_upload(&dir.path().join("missing.png"), 0).is_err());
    }
}
