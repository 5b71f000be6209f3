pub mod health;
pub mod media_file;
pub mod video_create;
pub mod video_get;
pub mod video_upload;
