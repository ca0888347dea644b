//! Media processing: upload naming, image re-encoding and video transcoding.
//!
//! - [`naming`] derives the stored extension and a collision-resistant filename
//! - [`image`] re-encodes uploaded images at a requested quality
//! - [`video`] discovers the encoder binary and drives a transcode per upload

pub mod image;
pub mod naming;
pub mod video;

pub use crate::image::{encode_image, EncodeError, ImageQuality};
pub use naming::{Clock, FileNamer, SystemClock};
pub use video::{
    discover_ffmpeg, DegradeReason, EncoderError, EncoderEvent, FfmpegEncoder,
    TranscodeError, TranscodeOrchestrator, TranscodeOutcome, TranscodeState, VideoEncoder,
};
