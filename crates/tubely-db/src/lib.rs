//! Tubely Database Layer
//!
//! The metadata store capability: a `VideoRepository` trait with a Postgres
//! implementation and an in-process one.

// Module declarations
pub mod db;

// Re-exports
pub use db::{
    create_video_repository, InMemoryVideoRepository, PostgresVideoRepository, VideoRepository,
};
