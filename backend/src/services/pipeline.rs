//! Channel → playlist → video extraction.

use crate::config::PipelineSettings;
use crate::errors::{PipelineError, StageError};
use crate::models::{PipelineStage, RecordSets};
use crate::services::channel_collector::ChannelCollector;
use crate::services::playlist_collector::PlaylistCollector;
use crate::services::video_collector::VideoCollector;
use crate::youtube::YouTubeApi;
use log::{error, info};
use std::sync::Arc;

pub struct Pipeline {
    channels: ChannelCollector,
    playlists: PlaylistCollector,
    videos: VideoCollector,
}

impl Pipeline {
    pub fn new(api: Arc<dyn YouTubeApi>, settings: &PipelineSettings) -> Self {
        Self {
            channels: ChannelCollector::new(api.clone()),
            playlists: PlaylistCollector::new(
                api.clone(),
                settings.page_size,
                settings.fetch_concurrency,
            ),
            videos: VideoCollector::new(
                api,
                settings.page_size,
                settings.detail_batch_size,
                settings.fetch_concurrency,
                settings.timezone,
            ),
        }
    }

    /// Runs the three stages in order. Each stage starts only once the
    /// previous one has finished; the first failure halts the run and no
    /// record set is returned.
    pub async fn run(&self, channel_ids: &[String]) -> Result<RecordSets, StageError> {
        info!("Fetching channel data for {} channels...", channel_ids.len());
        let channels = self
            .channels
            .collect(channel_ids)
            .await
            .map_err(|source| halt(PipelineStage::Channels, source))?;

        info!("Fetching playlist data...");
        let playlists = self
            .playlists
            .collect(channel_ids)
            .await
            .map_err(|source| halt(PipelineStage::Playlists, source))?;

        info!("Fetching video data for {} playlists...", playlists.len());
        let videos = self
            .videos
            .collect(&playlists)
            .await
            .map_err(|source| halt(PipelineStage::Videos, source))?;

        info!(
            "Pipeline {}: {} channels, {} playlists, {} videos",
            PipelineStage::Done,
            channels.len(),
            playlists.len(),
            videos.len()
        );
        Ok(RecordSets {
            channels,
            playlists,
            videos,
        })
    }
}

fn halt(stage: PipelineStage, source: PipelineError) -> StageError {
    error!("Pipeline halted during {stage} stage: {source}");
    StageError { stage, source }
}
