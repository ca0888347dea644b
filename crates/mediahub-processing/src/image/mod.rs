//! Image re-encoding for the dedicated image upload route.

pub mod encoder;

pub use encoder::{encode, encode_image, EncodeError, ImageQuality};
