//! Video compression: encoder discovery, the encoder seam and the per-upload orchestrator.

pub mod discovery;
pub mod encoder;
pub mod orchestration;

pub use discovery::{discover_ffmpeg, FFMPEG_CANDIDATES};
pub use encoder::{EncoderError, EncoderEvent, FfmpegEncoder, VideoEncoder};
pub use orchestration::{
    DegradeReason, TranscodeError, TranscodeOrchestrator, TranscodeOutcome, TranscodeState,
};
