//! Test fixtures: generated images and opaque video blobs.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Solid-colour PNG of the given dimensions.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 90]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode test PNG");
    out.into_inner()
}

/// Arbitrary bytes standing in for a video container.
pub fn create_test_video() -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.extend((0..4096u32).map(|i| (i % 251) as u8));
    data
}
