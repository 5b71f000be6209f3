pub mod media;
pub mod video;

pub use media::{AspectClass, MediaGeometry};
pub use video::{NewVideo, VideoLocator, VideoRecord, VideoResponse};
