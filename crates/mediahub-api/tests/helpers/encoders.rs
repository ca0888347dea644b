//! Scripted encoders standing in for ffmpeg.

use async_trait::async_trait;
use mediahub_processing::{EncoderError, EncoderEvent, VideoEncoder};
use std::path::Path;
use tokio::sync::mpsc;

pub const ENCODED_BYTES: &[u8] = b"encoded-output";

/// Writes [`ENCODED_BYTES`] to the target and reports success.
pub struct SucceedingEncoder;

#[async_trait]
impl VideoEncoder for SucceedingEncoder {
    async fn start(
        &self,
        source: &Path,
        target: &Path,
    ) -> Result<mpsc::Receiver<EncoderEvent>, EncoderError> {
        assert!(source.is_file(), "original must be on disk before encoding");
        tokio::fs::write(target, ENCODED_BYTES).await.unwrap();

        let (tx, rx) = mpsc::channel(4);
        tx.send(EncoderEvent::Started {
            command: "scripted".to_string(),
        })
        .await
        .unwrap();
        tx.send(EncoderEvent::Progress { out_time_ms: 500 })
            .await
            .unwrap();
        tx.send(EncoderEvent::Finished).await.unwrap();
        Ok(rx)
    }

    fn name(&self) -> &str {
        "scripted-success"
    }
}

/// Leaves partial output behind and reports failure.
pub struct FailingEncoder;

#[async_trait]
impl VideoEncoder for FailingEncoder {
    async fn start(
        &self,
        _source: &Path,
        target: &Path,
    ) -> Result<mpsc::Receiver<EncoderEvent>, EncoderError> {
        tokio::fs::write(target, b"partial").await.unwrap();

        let (tx, rx) = mpsc::channel(4);
        tx.send(EncoderEvent::Failed {
            reason: "scripted failure".to_string(),
        })
        .await
        .unwrap();
        Ok(rx)
    }

    fn name(&self) -> &str {
        "scripted-failure"
    }
}
