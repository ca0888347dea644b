//! Per-upload video pipeline: persist original → encode → respond.
//!
//! Every upload ends in exactly one [`TranscodeOutcome`] or [`TranscodeError`]. When the
//! encoder is missing, refuses to start, fails, or runs past the timeout, the original
//! is copied byte-for-byte under the compressed name so the upload still succeeds.
//!
//! The pipeline runs on its own task, so a client that disconnects mid-upload does not
//! stop it halfway.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mediahub_core::MediaCategory;
use mediahub_storage::{MediaLocation, StorageError, StorageLocator, WriteTarget, COMPRESSED_PREFIX};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::Instrument;

use super::encoder::{EncoderEvent, VideoEncoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeState {
    Received,
    Writing,
    TranscoderUnavailable,
    Encoding,
    Completed,
    Failed,
    Responded,
}

/// Why an upload was served uncompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    Unavailable,
    StartFailed(String),
    EncoderFailed(String),
    TimedOut(Duration),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Unavailable => f.write_str("encoder unavailable"),
            DegradeReason::StartFailed(e) => write!(f, "encoder failed to start: {}", e),
            DegradeReason::EncoderFailed(e) => write!(f, "encoder failed: {}", e),
            DegradeReason::TimedOut(after) => {
                write!(f, "encoder timed out after {}s", after.as_secs())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeOutcome {
    /// The encoder produced the compressed file and the original was removed.
    Compressed { filename: String },
    /// The original was copied under the compressed name and kept.
    Degraded {
        filename: String,
        reason: DegradeReason,
    },
}

impl TranscodeOutcome {
    pub fn filename(&self) -> &str {
        match self {
            TranscodeOutcome::Compressed { filename } => filename,
            TranscodeOutcome::Degraded { filename, .. } => filename,
        }
    }

    /// Path the file is served under, relative to the service root (`video/<name>`).
    pub fn served_path(&self) -> String {
        format!("{}/{}", MediaCategory::Video, self.filename())
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to store original video: {0}")]
    WriteOriginal(#[source] StorageError),

    #[error("Fallback copy failed ({reason}): {source}")]
    FallbackCopyFailed {
        reason: DegradeReason,
        #[source]
        source: StorageError,
    },

    #[error("Upload already responded")]
    AlreadyResponded,

    #[error("Video pipeline task failed: {0}")]
    Task(String),
}

/// State of one upload. Owned by the pipeline task that created it.
struct TranscodeJob {
    filename: String,
    state: TranscodeState,
    responded: AtomicBool,
    started: Instant,
}

impl TranscodeJob {
    fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            state: TranscodeState::Received,
            responded: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    fn enter(&mut self, next: TranscodeState) {
        tracing::debug!(
            filename = %self.filename,
            from = ?self.state,
            to = ?next,
            "Transcode state transition"
        );
        self.state = next;
    }

    /// The single transition into `Responded`. A second call is refused.
    fn respond(
        &mut self,
        result: Result<TranscodeOutcome, TranscodeError>,
    ) -> Result<TranscodeOutcome, TranscodeError> {
        if self
            .responded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::error!(filename = %self.filename, "Upload already responded, dropping result");
            return Err(TranscodeError::AlreadyResponded);
        }
        self.enter(TranscodeState::Responded);

        match &result {
            Ok(outcome) => tracing::info!(
                filename = %self.filename,
                served = %outcome.served_path(),
                degraded = matches!(outcome, TranscodeOutcome::Degraded { .. }),
                duration_ms = self.started.elapsed().as_secs_f64() * 1000.0,
                "Video upload processed"
            ),
            Err(e) => tracing::error!(
                filename = %self.filename,
                error = %e,
                duration_ms = self.started.elapsed().as_secs_f64() * 1000.0,
                "Video upload failed"
            ),
        }
        result
    }
}

/// Drives the encoder for dedicated video uploads.
#[derive(Clone)]
pub struct TranscodeOrchestrator {
    locator: StorageLocator,
    encoder: Option<Arc<dyn VideoEncoder>>,
    timeout: Option<Duration>,
}

impl TranscodeOrchestrator {
    /// `encoder` is `None` when no encoder binary was found at startup. `timeout` bounds a
    /// single encoder run; `None` waits indefinitely.
    pub fn new(
        locator: StorageLocator,
        encoder: Option<Arc<dyn VideoEncoder>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            locator,
            encoder,
            timeout,
        }
    }

    pub fn is_available(&self) -> bool {
        self.encoder.is_some()
    }

    pub fn encoder_name(&self) -> Option<&str> {
        self.encoder.as_deref().map(|e| e.name())
    }

    /// Store `data` as `filename` in the canonical video directory and produce
    /// `compressed-<filename>` next to it.
    ///
    /// Dropping the returned future does not cancel the work: the spawned pipeline
    /// still reaches a terminal state and cleans up after itself.
    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    pub async fn process(
        &self,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<TranscodeOutcome, TranscodeError> {
        let pipeline = self.clone();
        let filename = filename.to_string();
        let task = tokio::spawn(
            async move { pipeline.run(&filename, &data).await }.instrument(tracing::Span::current()),
        );
        task.await
            .map_err(|e| TranscodeError::Task(e.to_string()))?
    }

    async fn run(&self, filename: &str, data: &[u8]) -> Result<TranscodeOutcome, TranscodeError> {
        let mut job = TranscodeJob::new(filename);

        job.enter(TranscodeState::Writing);
        let original = match self.write_original(filename, data).await {
            Ok(location) => location,
            Err(e) => return job.respond(Err(TranscodeError::WriteOriginal(e))),
        };
        let target = match self
            .locator
            .sibling(&original, &format!("{}{}", COMPRESSED_PREFIX, filename))
        {
            Ok(location) => location,
            Err(e) => return job.respond(Err(TranscodeError::WriteOriginal(e))),
        };

        let Some(encoder) = self.encoder.as_ref() else {
            job.enter(TranscodeState::TranscoderUnavailable);
            let result = self
                .fallback(&original, &target, DegradeReason::Unavailable)
                .await;
            return job.respond(result);
        };

        job.enter(TranscodeState::Encoding);
        let events = match encoder.start(&original.path, &target.path).await {
            Ok(events) => events,
            Err(e) => {
                job.enter(TranscodeState::Failed);
                let result = self
                    .fallback(&original, &target, DegradeReason::StartFailed(e.to_string()))
                    .await;
                return job.respond(result);
            }
        };

        match self.run_encoder(filename, events).await {
            Ok(()) => {
                job.enter(TranscodeState::Completed);
                let result = self.complete(&original, &target).await;
                job.respond(result)
            }
            Err(reason) => {
                job.enter(TranscodeState::Failed);
                let result = self.fallback(&original, &target, reason).await;
                job.respond(result)
            }
        }
    }

    async fn write_original(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<MediaLocation, StorageError> {
        let location = self
            .locator
            .resolve_write_path(MediaCategory::Video, WriteTarget::Dedicated, filename)
            .await?;
        self.locator.storage().write(&location.key, data).await?;
        Ok(location)
    }

    /// Consume events until the first terminal one, bounded by the timeout.
    /// Dropping the receiver on return stops the encoder if it is still running.
    async fn run_encoder(
        &self,
        filename: &str,
        mut events: mpsc::Receiver<EncoderEvent>,
    ) -> Result<(), DegradeReason> {
        let wait = wait_for_terminal(filename, &mut events);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .unwrap_or(Err(DegradeReason::TimedOut(limit))),
            None => wait.await,
        }
    }

    async fn complete(
        &self,
        original: &MediaLocation,
        target: &MediaLocation,
    ) -> Result<TranscodeOutcome, TranscodeError> {
        let storage = self.locator.storage();
        match storage.is_file(&target.key).await {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                let reason = DegradeReason::EncoderFailed(
                    "encoder reported success but produced no output".to_string(),
                );
                return self.fallback(original, target, reason).await;
            }
        }

        if let Err(e) = storage.delete(&original.key).await {
            tracing::warn!(key = %original.key, error = %e, "Could not remove original video after compression");
        }

        Ok(TranscodeOutcome::Compressed {
            filename: target.filename().to_string(),
        })
    }

    async fn fallback(
        &self,
        original: &MediaLocation,
        target: &MediaLocation,
        reason: DegradeReason,
    ) -> Result<TranscodeOutcome, TranscodeError> {
        tracing::warn!(
            original = %original.key,
            target = %target.key,
            reason = %reason,
            "Serving uncompressed copy"
        );
        let storage = self.locator.storage();

        // Unlink any partial output first so a still-running encoder writes to an orphaned inode.
        if let Err(e) = storage.delete(&target.key).await {
            tracing::warn!(key = %target.key, error = %e, "Could not remove partial encoder output");
        }

        match storage.copy(&original.key, &target.key).await {
            Ok(_) => Ok(TranscodeOutcome::Degraded {
                filename: target.filename().to_string(),
                reason,
            }),
            Err(source) => Err(TranscodeError::FallbackCopyFailed { reason, source }),
        }
    }
}

impl fmt::Debug for TranscodeOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeOrchestrator")
            .field("encoder", &self.encoder_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

async fn wait_for_terminal(
    filename: &str,
    events: &mut mpsc::Receiver<EncoderEvent>,
) -> Result<(), DegradeReason> {
    while let Some(event) = events.recv().await {
        match event {
            EncoderEvent::Started { command } => {
                tracing::info!(filename = %filename, command = %command, "Encoder started")
            }
            EncoderEvent::Progress { out_time_ms } => {
                tracing::debug!(filename = %filename, out_time_ms, "Encoder progress")
            }
            EncoderEvent::Finished => return Ok(()),
            EncoderEvent::Failed { reason } => return Err(DegradeReason::EncoderFailed(reason)),
        }
    }
    Err(DegradeReason::EncoderFailed(
        "encoder stopped without reporting a result".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::encoder::EncoderError;
    use async_trait::async_trait;
    use mediahub_storage::LocalStorage;
    use std::path::Path;
    use tempfile::tempdir;

    #[derive(Clone, Copy)]
    enum Script {
        Succeed,
        SucceedWithoutOutput,
        Fail,
        FailThenFinish,
        RefuseToStart,
        Hang,
        SucceedSlowly,
    }

    struct ScriptedEncoder(Script);

    #[async_trait]
    impl VideoEncoder for ScriptedEncoder {
        async fn start(
            &self,
            _source: &Path,
            target: &Path,
        ) -> Result<mpsc::Receiver<EncoderEvent>, EncoderError> {
            if let Script::RefuseToStart = self.0 {
                return Err(EncoderError::Spawn {
                    binary: "scripted".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no binary"),
                });
            }

            let (tx, rx) = mpsc::channel(8);
            let script = self.0;
            let target = target.to_path_buf();
            tokio::spawn(async move {
                if let Script::Hang = script {
                    tokio::fs::write(&target, b"partial").await.unwrap();
                }
                let _ = tx
                    .send(EncoderEvent::Started {
                        command: "scripted".to_string(),
                    })
                    .await;
                let _ = tx.send(EncoderEvent::Progress { out_time_ms: 500 }).await;
                match script {
                    Script::Succeed => {
                        tokio::fs::write(&target, b"encoded").await.unwrap();
                        let _ = tx.send(EncoderEvent::Finished).await;
                    }
                    Script::SucceedWithoutOutput => {
                        let _ = tx.send(EncoderEvent::Finished).await;
                    }
                    Script::Fail => {
                        let _ = tx
                            .send(EncoderEvent::Failed {
                                reason: "codec exploded".to_string(),
                            })
                            .await;
                    }
                    Script::FailThenFinish => {
                        let _ = tx
                            .send(EncoderEvent::Failed {
                                reason: "first".to_string(),
                            })
                            .await;
                        let _ = tx.send(EncoderEvent::Finished).await;
                    }
                    Script::Hang => tx.closed().await,
                    Script::SucceedSlowly => {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        tokio::fs::write(&target, b"encoded").await.unwrap();
                        let _ = tx.send(EncoderEvent::Finished).await;
                    }
                    Script::RefuseToStart => unreachable!(),
                }
            });
            Ok(rx)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    async fn orchestrator(
        root: &Path,
        script: Option<Script>,
        timeout: Option<Duration>,
    ) -> TranscodeOrchestrator {
        let locator = StorageLocator::new(LocalStorage::new(root).await.unwrap());
        let encoder = script.map(|s| Arc::new(ScriptedEncoder(s)) as Arc<dyn VideoEncoder>);
        TranscodeOrchestrator::new(locator, encoder, timeout)
    }

    const ORIGINAL: &[u8] = b"original video bytes";

    #[tokio::test]
    async fn test_success_removes_original() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), Some(Script::Succeed), None).await;

        let outcome = orch.process("clip-1.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert_eq!(
            outcome,
            TranscodeOutcome::Compressed {
                filename: "compressed-clip-1.mp4".to_string()
            }
        );
        assert_eq!(outcome.served_path(), "video/compressed-clip-1.mp4");
        assert_eq!(
            std::fs::read(dir.path().join("video/compressed-clip-1.mp4")).unwrap(),
            b"encoded"
        );
        assert!(!dir.path().join("video/clip-1.mp4").exists());
    }

    #[tokio::test]
    async fn test_unavailable_copies_original() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), None, None).await;
        assert!(!orch.is_available());

        let outcome = orch.process("clip-2.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert_eq!(
            outcome,
            TranscodeOutcome::Degraded {
                filename: "compressed-clip-2.mp4".to_string(),
                reason: DegradeReason::Unavailable
            }
        );
        assert_eq!(
            std::fs::read(dir.path().join("video/compressed-clip-2.mp4")).unwrap(),
            ORIGINAL
        );
        assert!(dir.path().join("video/clip-2.mp4").exists());
    }

    #[tokio::test]
    async fn test_encoder_failure_falls_back() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), Some(Script::Fail), None).await;

        let outcome = orch.process("clip-3.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert_eq!(
            outcome,
            TranscodeOutcome::Degraded {
                filename: "compressed-clip-3.mp4".to_string(),
                reason: DegradeReason::EncoderFailed("codec exploded".to_string())
            }
        );
        assert_eq!(
            std::fs::read(dir.path().join("video/compressed-clip-3.mp4")).unwrap(),
            ORIGINAL
        );
    }

    #[tokio::test]
    async fn test_start_failure_falls_back() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), Some(Script::RefuseToStart), None).await;

        let outcome = orch.process("clip-4.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert!(matches!(
            outcome,
            TranscodeOutcome::Degraded {
                reason: DegradeReason::StartFailed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_first_terminal_event_wins() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), Some(Script::FailThenFinish), None).await;

        let outcome = orch.process("clip-5.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert_eq!(
            outcome,
            TranscodeOutcome::Degraded {
                filename: "compressed-clip-5.mp4".to_string(),
                reason: DegradeReason::EncoderFailed("first".to_string())
            }
        );
        assert!(dir.path().join("video/clip-5.mp4").exists());
    }

    #[tokio::test]
    async fn test_success_without_output_falls_back() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), Some(Script::SucceedWithoutOutput), None).await;

        let outcome = orch.process("clip-6.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert!(matches!(outcome, TranscodeOutcome::Degraded { .. }));
        assert_eq!(
            std::fs::read(dir.path().join("video/compressed-clip-6.mp4")).unwrap(),
            ORIGINAL
        );
    }

    #[tokio::test]
    async fn test_timeout_replaces_partial_output_with_copy() {
        let dir = tempdir().unwrap();
        let limit = Duration::from_millis(100);
        let orch = orchestrator(dir.path(), Some(Script::Hang), Some(limit)).await;

        let outcome = orch.process("clip-7.mp4", ORIGINAL.to_vec()).await.unwrap();
        assert_eq!(
            outcome,
            TranscodeOutcome::Degraded {
                filename: "compressed-clip-7.mp4".to_string(),
                reason: DegradeReason::TimedOut(limit)
            }
        );
        assert_eq!(
            std::fs::read(dir.path().join("video/compressed-clip-7.mp4")).unwrap(),
            ORIGINAL
        );
    }

    #[tokio::test]
    async fn test_failed_fallback_copy_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory squatting on the target name makes the copy fail.
        std::fs::create_dir_all(dir.path().join("video/compressed-clip-8.mp4")).unwrap();
        let orch = orchestrator(dir.path(), Some(Script::Fail), None).await;

        let err = orch.process("clip-8.mp4", ORIGINAL.to_vec()).await.unwrap_err();
        match err {
            TranscodeError::FallbackCopyFailed { reason, .. } => {
                assert_eq!(reason, DegradeReason::EncoderFailed("codec exploded".to_string()))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("video"), b"not a directory").unwrap();
        let orch = orchestrator(dir.path(), Some(Script::Succeed), None).await;

        let err = orch.process("clip-9.mp4", ORIGINAL.to_vec()).await.unwrap_err();
        assert!(matches!(err, TranscodeError::WriteOriginal(_)));
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_abandon_pipeline() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(dir.path(), Some(Script::SucceedSlowly), None).await;

        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            orch.process("clip-10.mp4", ORIGINAL.to_vec()),
        )
        .await;
        assert!(dropped.is_err());

        let compressed = dir.path().join("video/compressed-clip-10.mp4");
        let original = dir.path().join("video/clip-10.mp4");
        for _ in 0..100 {
            if compressed.exists() && !original.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(std::fs::read(&compressed).unwrap(), b"encoded");
        assert!(!original.exists());
    }

    #[test]
    fn test_job_responds_once() {
        let mut job = TranscodeJob::new("a.mp4");
        let first = job.respond(Ok(TranscodeOutcome::Compressed {
            filename: "compressed-a.mp4".to_string(),
        }));
        assert!(first.is_ok());
        assert_eq!(job.state, TranscodeState::Responded);

        let second = job.respond(Ok(TranscodeOutcome::Compressed {
            filename: "compressed-a.mp4".to_string(),
        }));
        assert!(matches!(second, Err(TranscodeError::AlreadyResponded)));
    }
}
