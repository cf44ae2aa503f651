use crate::errors::PipelineResult;
use crate::models::{PlaylistRecord, VideoRecord};
use crate::services::paginator::{decode, pages, single_page};
use crate::youtube::items::{PlaylistMembership, VideoItem};
use crate::youtube::{ListRequest, Resource, YouTubeApi, PLATFORM_MAX_PAGE_SIZE};
use chrono_tz::Tz;
use futures::{stream, StreamExt, TryStreamExt};
use log::{debug, info};
use std::pin::pin;
use std::sync::Arc;

const MEMBERSHIP_PARTS: &str = "contentDetails";
const DETAIL_PARTS: &str = "snippet,statistics";

/// Resolves the videos of each playlist, one row per membership.
pub struct VideoCollector {
    api: Arc<dyn YouTubeApi>,
    page_size: u32,
    batch_size: usize,
    concurrency: usize,
    timezone: Tz,
}

impl VideoCollector {
    pub fn new(
        api: Arc<dyn YouTubeApi>,
        page_size: u32,
        batch_size: usize,
        concurrency: usize,
        timezone: Tz,
    ) -> Self {
        Self {
            api,
            page_size,
            batch_size: batch_size.clamp(1, PLATFORM_MAX_PAGE_SIZE as usize),
            concurrency: concurrency.max(1),
            timezone,
        }
    }

    /// Rows for every playlist, in playlist order. A video listed in several
    /// playlists yields one row per playlist.
    pub async fn collect(&self, playlists: &[PlaylistRecord]) -> PipelineResult<Vec<VideoRecord>> {
        let playlist_ids: Vec<String> = playlists.iter().map(|p| p.playlist_id.clone()).collect();
        let per_playlist: Vec<Vec<VideoRecord>> = stream::iter(playlist_ids)
            .map(|playlist_id| async move { self.collect_playlist(&playlist_id).await })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(per_playlist.into_iter().flatten().collect())
    }

    async fn collect_playlist(&self, playlist_id: &str) -> PipelineResult<Vec<VideoRecord>> {
        let video_ids = self.video_ids(playlist_id).await?;
        info!("Fetched {} videos from playlist: {playlist_id}", video_ids.len());

        let mut records = Vec::with_capacity(video_ids.len());
        for batch in video_ids.chunks(self.batch_size) {
            records.extend(self.video_details(playlist_id, batch).await?);
        }
        Ok(records)
    }

    /// Member video ids in playlist order, duplicates included.
    pub async fn video_ids(&self, playlist_id: &str) -> PipelineResult<Vec<String>> {
        let request = ListRequest::new(Resource::PlaylistItems, MEMBERSHIP_PARTS)
            .filter("playlistId", playlist_id)
            .max_results(self.page_size);

        let mut video_ids = Vec::new();
        let mut stream = pin!(pages(self.api.as_ref(), request.clone()));
        while let Some(items) = stream.try_next().await? {
            for item in items {
                let membership: PlaylistMembership = decode(&request, item)?;
                match membership.content_details.video_id {
                    Some(video_id) => video_ids.push(video_id),
                    None => debug!("Playlist item without video id in {playlist_id}"),
                }
            }
        }
        Ok(video_ids)
    }

    async fn video_details(
        &self,
        playlist_id: &str,
        batch: &[String],
    ) -> PipelineResult<Vec<VideoRecord>> {
        let request = ListRequest::new(Resource::Videos, DETAIL_PARTS).filter("id", batch.join(","));

        let items = single_page(self.api.as_ref(), &request).await?;
        items
            .into_iter()
            .map(|item| -> PipelineResult<VideoRecord> {
                let item: VideoItem = decode(&request, item)?;
                Ok(item.into_record(playlist_id, self.timezone))
            })
            .collect()
    }
}
