//! Fast-start remuxing: same streams, index moved to the front.

use crate::process::{run_tool, ToolError};
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tubely_core::constants::REMUXED_FILE_SUFFIX;

#[derive(Debug, Error)]
pub enum RemuxError {
    /// `stderr` is kept for logs only and is not part of the message.
    #[error("remux failed: {message}")]
    ToolFailure { message: String, stderr: String },
}

impl From<ToolError> for RemuxError {
    fn from(err: ToolError) -> Self {
        RemuxError::ToolFailure {
            stderr: err.stderr().to_string(),
            message: err.to_string(),
        }
    }
}

/// Where the remuxed copy of `input` is written: the input path with
/// `.processing` appended.
pub fn remuxed_path_for(input: &Path) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(REMUXED_FILE_SUFFIX);
    PathBuf::from(path)
}

/// Rewrites a media file for progressive playback without re-encoding.
///
/// Implementations write to [`remuxed_path_for`] the input and return that
/// path. The input is never modified; the caller owns both files.
#[async_trait]
pub trait StreamRemuxer: Send + Sync {
    async fn remux(&self, input: &Path) -> Result<PathBuf, RemuxError>;
}

/// `StreamRemuxer` backed by the ffmpeg executable.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl StreamRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path) -> Result<PathBuf, RemuxError> {
        let output = remuxed_path_for(input);
        let args = [
            OsStr::new("-y"),
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output.as_os_str(),
        ];
        run_tool(&self.ffmpeg_path, &args, self.timeout).await?;

        tracing::info!(output = %output.display(), "Remux completed");
        Ok(output)
    }
}
