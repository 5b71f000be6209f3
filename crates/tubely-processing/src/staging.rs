//! Local scratch files for in-flight uploads.

use std::io;
use std::path::{Path, PathBuf};
use tubely_core::constants::{STAGED_FILE_PREFIX, VIDEO_EXTENSION};

/// A local file owned by one ingestion.
///
/// The file is removed by [`ScratchFile::release`] or, failing that, when the
/// guard is dropped. Removing a file that is already gone is not an error.
#[derive(Debug)]
pub struct ScratchFile {
    path: Option<PathBuf>,
}

impl ScratchFile {
    /// Take ownership of `path`, whether or not it exists yet.
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Path of the guarded file, `None` once released.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Remove the file. Safe to call more than once.
    pub async fn release(&mut self) {
        if let Some(path) = self.path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Scratch file removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove scratch file"
                ),
            }
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove scratch file on drop"
                    );
                }
            }
        }
    }
}

/// Directory where uploads are staged.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a fresh, uniquely named `tubely-upload-*.mp4` file opened for
    /// writing, together with the guard that removes it.
    pub async fn create(&self) -> io::Result<(tokio::fs::File, ScratchFile)> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let suffix = format!(".{}", VIDEO_EXTENSION);
        let (file, path) = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?
            .keep()?;

        Ok((tokio::fs::File::from_std(file), ScratchFile::adopt(path)))
    }
}
