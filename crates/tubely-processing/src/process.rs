//! Running external media tools.

use std::ffi::OsStr;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Longest stderr tail kept for diagnostics.
const MAX_STDERR_BYTES: usize = 4096;

#[derive(Debug)]
pub(crate) enum ToolError {
    Spawn {
        program: String,
        source: std::io::Error,
    },
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    TimedOut {
        program: String,
        limit: Duration,
    },
}

impl ToolError {
    /// Captured stderr, empty when the tool never ran to completion.
    pub(crate) fn stderr(&self) -> &str {
        match self {
            ToolError::Exit { stderr, .. } => stderr,
            _ => "",
        }
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ToolError::Spawn { program, source } => {
                write!(f, "failed to start {}: {}", program, source)
            }
            ToolError::Exit { program, code, .. } => match code {
                Some(code) => write!(f, "{} exited with status {}", program, code),
                None => write!(f, "{} was terminated by a signal", program),
            },
            ToolError::TimedOut { program, limit } => {
                write!(f, "{} did not finish within {}s", program, limit.as_secs_f64())
            }
        }
    }
}

/// Run `program` to completion and return its output.
///
/// Stdin is closed and both output streams are captured. The child is killed
/// when the returned future is dropped, which covers both the timeout and the
/// caller abandoning the request.
#[tracing::instrument(skip(args), fields(process.executable.name = %program))]
pub(crate) async fn run_tool(
    program: &str,
    args: &[&OsStr],
    limit: Duration,
) -> Result<Output, ToolError> {
    let start = Instant::now();

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(limit, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ToolError::Spawn {
                program: program.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(ToolError::TimedOut {
                program: program.to_string(),
                limit,
            })
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    if !output.status.success() {
        let stderr = stderr_tail(&output.stderr);
        tracing::debug!(
            duration_ms = duration_ms,
            code = ?output.status.code(),
            stderr = %stderr,
            "Tool exited with failure"
        );
        return Err(ToolError::Exit {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    tracing::debug!(duration_ms = duration_ms, "Tool finished");
    Ok(output)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(MAX_STDERR_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
