//! Tubely media processing
//!
//! The ingestion pipeline and its building blocks:
//!
//! - [`probe`]: reads the geometry of the first video stream (ffprobe).
//! - [`aspect`]: classifies a geometry as landscape, portrait or other.
//! - [`remux`]: rewrites a file with its index moved to the front (ffmpeg).
//! - [`keys`]: random, class-prefixed object keys.
//! - [`staging`]: scratch files that are removed on every exit path.
//! - [`ingest`]: the orchestrator sequencing all of the above.
//! - [`access`]: signed, expiring URLs for stored videos.

pub mod access;
pub mod aspect;
pub mod ingest;
pub mod keys;
pub(crate) mod process;
pub mod probe;
pub mod remux;
pub mod staging;

pub use access::SignedAccessIssuer;
pub use aspect::classify;
pub use ingest::{
    FailureReason, IngestError, IngestOutcome, IngestState, IngestionOrchestrator, UploadRequest,
};
pub use keys::{KeyError, ObjectKey};
pub use probe::{FfprobeProber, MediaProber, ProbeError};
pub use remux::{remuxed_path_for, FfmpegRemuxer, RemuxError, StreamRemuxer};
pub use staging::{ScratchFile, StagingArea};
