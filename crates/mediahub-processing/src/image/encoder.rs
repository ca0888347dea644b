use ::image::codecs::jpeg::JpegEncoder;
use ::image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Quality must be between 1 and 100")]
    InvalidQuality,

    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] ImageError),

    #[error("Image encoding task failed: {0}")]
    Task(String),
}

/// JPEG quality, 1 through 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageQuality(u8);

impl ImageQuality {
    pub const DEFAULT: ImageQuality = ImageQuality(80);

    pub fn new(value: u8) -> Result<Self, EncodeError> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EncodeError::InvalidQuality)
        }
    }

    /// Parse the optional route segment. Absent means `default`; anything that is not an
    /// integer in range is rejected.
    pub fn parse(raw: Option<&str>, default: ImageQuality) -> Result<Self, EncodeError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(default),
            Some(value) => value
                .parse::<i64>()
                .ok()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or(EncodeError::InvalidQuality)
                .and_then(Self::new),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for ImageQuality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Re-encode `data` into the format named by `extension` (with leading dot).
///
/// JPEG output honours `quality`. Other raster formats are written losslessly.
/// SVG, and any extension without a raster codec, is returned unchanged. A TIFF the
/// codec cannot decode or write is stored as received.
pub fn encode(data: &[u8], extension: &str, quality: ImageQuality) -> Result<Vec<u8>, EncodeError> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    let Some(format) = ImageFormat::from_extension(&ext) else {
        return Ok(data.to_vec());
    };

    match reencode(data, format, quality) {
        Err(e) if format == ImageFormat::Tiff => {
            tracing::warn!(error = %e, input_bytes = data.len(), "Storing TIFF as received");
            Ok(data.to_vec())
        }
        result => result,
    }
}

fn reencode(data: &[u8], format: ImageFormat, quality: ImageQuality) -> Result<Vec<u8>, EncodeError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| EncodeError::Decode(ImageError::IoError(e)))?
        .decode()
        .map_err(EncodeError::Decode)?;

    let mut buffer = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, quality.value())
                .encode_image(&rgb)
                .map_err(EncodeError::Encode)?;
        }
        other => {
            // 8-bit RGBA is accepted by every enabled encoder.
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut Cursor::new(&mut buffer), other)
                .map_err(EncodeError::Encode)?;
        }
    }

    tracing::debug!(
        format = ?format,
        quality = quality.value(),
        input_bytes = data.len(),
        output_bytes = buffer.len(),
        "Image re-encoded"
    );

    Ok(buffer)
}

/// [`encode`] on the blocking pool; decoding is CPU-bound.
pub async fn encode_image(
    data: Vec<u8>,
    extension: String,
    quality: ImageQuality,
) -> Result<Vec<u8>, EncodeError> {
    tokio::task::spawn_blocking(move || encode(&data, &extension, quality))
        .await
        .map_err(|e| EncodeError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Rgba, RgbaImage};

    fn sample_png() -> Vec<u8> {
        let mut img = RgbaImage::new(32, 32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 8) as u8, (y * 8) as u8, 128, 255]);
        }
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_quality_parse() {
        let default = ImageQuality::DEFAULT;
        assert_eq!(ImageQuality::parse(None, default).unwrap().value(), 80);
        assert_eq!(ImageQuality::parse(Some("55"), default).unwrap().value(), 55);
        assert_eq!(ImageQuality::parse(Some("100"), default).unwrap().value(), 100);
        assert!(ImageQuality::parse(Some("0"), default).is_err());
        assert!(ImageQuality::parse(Some("101"), default).is_err());
        assert!(ImageQuality::parse(Some("-3"), default).is_err());
        assert!(ImageQuality::parse(Some("high"), default).is_err());
    }

    #[test]
    fn test_png_to_jpeg_respects_quality() {
        let png = sample_png();
        let low = encode(&png, ".jpg", ImageQuality::new(5).unwrap()).unwrap();
        let high = encode(&png, ".jpg", ImageQuality::new(100).unwrap()).unwrap();

        assert_eq!(&low[..2], &[0xFF, 0xD8]);
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_png_stays_png() {
        let png = sample_png();
        let out = encode(&png, ".png", ImageQuality::DEFAULT).unwrap();
        assert_eq!(::image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_svg_passthrough() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        let out = encode(svg, ".svg", ImageQuality::DEFAULT).unwrap();
        assert_eq!(out, svg);
    }

    #[test]
    fn test_undecodable_tiff_is_stored_as_received() {
        let tiff = b"II*\0\x08\0\0\0truncated";
        let out = encode(tiff, ".tiff", ImageQuality::DEFAULT).unwrap();
        assert_eq!(out, tiff);
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let result = encode(b"not an image", ".jpg", ImageQuality::DEFAULT);
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[tokio::test]
    async fn test_encode_image_async() {
        let out = encode_image(sample_png(), ".jpg".to_string(), ImageQuality::DEFAULT)
            .await
            .unwrap();
        assert_eq!(::image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }
}
