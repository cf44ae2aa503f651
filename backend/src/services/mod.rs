pub mod channel_collector;
pub mod elasticsearch_service;
pub mod file_loader;
pub mod loader;
pub mod paginator;
pub mod pipeline;
pub mod playlist_collector;
pub mod snapshot_service;
pub mod video_collector;
