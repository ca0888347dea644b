//! External video encoder seam and its ffmpeg implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::mpsc;

/// Lifecycle of one encoder run, in order: `Started`, any number of `Progress`, then
/// exactly one of `Finished` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    Started { command: String },
    Progress { out_time_ms: u64 },
    Finished,
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("Failed to start encoder {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}

/// Compresses one video file into another.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Start encoding `source` into `target`.
    ///
    /// Returns once the run has started; progress and the outcome arrive on the
    /// channel. Dropping the receiver aborts the run.
    async fn start(
        &self,
        source: &Path,
        target: &Path,
    ) -> Result<mpsc::Receiver<EncoderEvent>, EncoderError>;

    fn name(&self) -> &str;
}

/// H.264 / AAC at half resolution through the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full argument list for one run. Progress is written as `key=value` lines to stdout.
    pub fn encode_args(source: &Path, target: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostats",
            "-progress",
            "pipe:1",
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(source.as_os_str().to_os_string());
        args.extend(
            [
                "-c:v",
                "libx264",
                "-crf",
                "28",
                "-preset",
                "medium",
                "-c:a",
                "aac",
                "-b:a",
                "128k",
                // Half of each dimension, rounded down to an even size for libx264.
                "-vf",
                "scale=trunc(iw/4)*2:trunc(ih/4)*2",
            ]
            .iter()
            .map(OsString::from),
        );
        args.push(target.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn start(
        &self,
        source: &Path,
        target: &Path,
    ) -> Result<mpsc::Receiver<EncoderEvent>, EncoderError> {
        let args = Self::encode_args(source, target);
        let command_line = std::iter::once(self.binary.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EncoderError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(drive(child, stdout, stderr, tx, command_line));
        Ok(rx)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

async fn drive(
    mut child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    tx: mpsc::Sender<EncoderEvent>,
    command: String,
) {
    if tx.send(EncoderEvent::Started { command }).await.is_err() {
        abort(&mut child).await;
        return;
    }

    let stderr_task = tokio::spawn(async move {
        let mut collected = String::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_string(&mut collected).await;
        }
        collected
    });

    if let Some(stdout) = stdout {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let line = tokio::select! {
                _ = tx.closed() => None,
                line = lines.next_line() => Some(line),
            };
            let Some(line) = line else {
                abort(&mut child).await;
                return;
            };
            match line {
                Ok(Some(line)) => {
                    if let Some(out_time_ms) = parse_progress_line(&line) {
                        if tx
                            .send(EncoderEvent::Progress { out_time_ms })
                            .await
                            .is_err()
                        {
                            abort(&mut child).await;
                            return;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read encoder progress");
                    break;
                }
            }
        }
    }

    let status = tokio::select! {
        _ = tx.closed() => None,
        status = child.wait() => Some(status),
    };
    let Some(status) = status else {
        abort(&mut child).await;
        return;
    };

    let stderr_text = stderr_task.await.unwrap_or_default();
    let event = match status {
        Ok(status) if status.success() => EncoderEvent::Finished,
        Ok(status) => EncoderEvent::Failed {
            reason: format!("ffmpeg exited with {}: {}", status, stderr_text.trim()),
        },
        Err(e) => EncoderEvent::Failed {
            reason: format!("Failed to wait for ffmpeg: {}", e),
        },
    };
    let _ = tx.send(event).await;
}

async fn abort(child: &mut Child) {
    tracing::warn!(pid = ?child.id(), "Encoder run abandoned, killing ffmpeg");
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "Failed to kill ffmpeg");
    }
}

/// Encoded position in milliseconds from a `-progress` line.
///
/// ffmpeg reports `out_time_us` (and, despite the name, `out_time_ms`) in microseconds.
fn parse_progress_line(line: &str) -> Option<u64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" => value.trim().parse::<u64>().ok().map(|us| us / 1000),
        _ => None,
    }
}
