//! Media probing: the geometry of the first video stream in a file.

use crate::process::{run_tool, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tubely_core::models::MediaGeometry;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no video stream with a usable frame size")]
    NoVideoStream,

    /// `stderr` is kept for logs only and is not part of the message.
    #[error("probe failed: {message}")]
    ToolFailure { message: String, stderr: String },
}

impl From<ToolError> for ProbeError {
    fn from(err: ToolError) -> Self {
        ProbeError::ToolFailure {
            stderr: err.stderr().to_string(),
            message: err.to_string(),
        }
    }
}

/// Reads stream geometry from a local file without modifying it.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaGeometry, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract the geometry of the first video stream from ffprobe's JSON.
///
/// Later video streams are ignored, so a first stream without a frame size
/// is `NoVideoStream` even if another one has one.
pub fn parse_ffprobe_output(stdout: &[u8]) -> Result<MediaGeometry, ProbeError> {
    let output: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::ToolFailure {
            message: format!("unparseable ffprobe output: {}", e),
            stderr: String::new(),
        })?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(ProbeError::NoVideoStream)?;

    MediaGeometry::new(stream.width.unwrap_or(0), stream.height.unwrap_or(0))
        .ok_or(ProbeError::NoVideoStream)
}

/// `MediaProber` backed by the ffprobe executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<MediaGeometry, ProbeError> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];
        let output = run_tool(&self.ffprobe_path, &args, self.timeout).await?;
        let geometry = parse_ffprobe_output(&output.stdout)?;

        tracing::info!(
            width = geometry.width(),
            height = geometry.height(),
            "Video probe completed"
        );
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_video_stream_wins() {
        let json = br#"{"streams":[
            {"codec_type":"audio","sample_rate":"48000"},
            {"codec_type":"video","width":1280,"height":720},
            {"codec_type":"video","width":640,"height":480}
        ]}"#;
        let geometry = parse_ffprobe_output(json).unwrap();
        assert_eq!((geometry.width(), geometry.height()), (1280, 720));
    }

    #[test]
    fn test_audio_only_is_no_video_stream() {
        let json = br#"{"streams":[{"codec_type":"audio"}]}"#;
        assert!(matches!(
            parse_ffprobe_output(json),
            Err(ProbeError::NoVideoStream)
        ));
    }

    #[test]
    fn test_zero_dimension_is_no_video_stream() {
        let json = br#"{"streams":[{"codec_type":"video","width":0,"height":720}]}"#;
        assert!(matches!(
            parse_ffprobe_output(json),
            Err(ProbeError::NoVideoStream)
        ));
        let missing = br#"{"streams":[{"codec_type":"video"}]}"#;
        assert!(matches!(
            parse_ffprobe_output(missing),
            Err(ProbeError::NoVideoStream)
        ));
    }

    #[test]
    fn test_garbage_is_tool_failure() {
        assert!(matches!(
            parse_ffprobe_output(b"not json"),
            Err(ProbeError::ToolFailure { .. })
        ));
        assert!(matches!(
            parse_ffprobe_output(b"{}"),
            Err(ProbeError::NoVideoStream)
        ));
    }

    #[cfg(unix)]
    mod with_stand_in {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn stand_in(dir: &Path, body: &str) -> String {
            let path = dir.join("ffprobe");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        #[tokio::test]
        async fn test_probe_reads_tool_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stand_in(
                dir.path(),
                r#"echo '{"streams":[{"codec_type":"video","width":1080,"height":1920}]}'"#,
            );
            let prober = FfprobeProber::new(tool, Duration::from_secs(10));

            let geometry = prober.probe(&dir.path().join("in.mp4")).await.unwrap();
            assert_eq!((geometry.width(), geometry.height()), (1080, 1920));
        }

        #[tokio::test]
        async fn test_probe_failure_keeps_stderr_out_of_message() {
            let dir = tempfile::tempdir().unwrap();
            let tool = stand_in(dir.path(), "echo 'moov atom not found' >&2; exit 1");
            let prober = FfprobeProber::new(tool, Duration::from_secs(10));

            match prober.probe(&dir.path().join("in.mp4")).await {
                Err(ProbeError::ToolFailure { message, stderr }) => {
                    assert_eq!(stderr, "moov atom not found");
                    assert!(!message.contains("moov"));
                }
                other => panic!("Expected ToolFailure, got {:?}", other),
            }
        }
    }
}
