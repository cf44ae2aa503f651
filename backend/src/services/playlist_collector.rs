use crate::errors::PipelineResult;
use crate::models::PlaylistRecord;
use crate::services::paginator::{decode, pages};
use crate::youtube::items::PlaylistItem;
use crate::youtube::{ListRequest, Resource, YouTubeApi};
use futures::{stream, StreamExt, TryStreamExt};
use log::info;
use std::pin::pin;
use std::sync::Arc;

const PLAYLIST_PARTS: &str = "snippet,contentDetails";

/// Enumerates every playlist owned by each channel.
pub struct PlaylistCollector {
    api: Arc<dyn YouTubeApi>,
    page_size: u32,
    concurrency: usize,
}

impl PlaylistCollector {
    pub fn new(api: Arc<dyn YouTubeApi>, page_size: u32, concurrency: usize) -> Self {
        Self {
            api,
            page_size,
            concurrency: concurrency.max(1),
        }
    }

    /// Rows grouped by channel in input order. The first failing channel
    /// aborts the whole collection.
    pub async fn collect(&self, channel_ids: &[String]) -> PipelineResult<Vec<PlaylistRecord>> {
        let per_channel: Vec<Vec<PlaylistRecord>> = stream::iter(channel_ids.iter().cloned())
            .map(|channel_id| async move { self.collect_channel(&channel_id).await })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(per_channel.into_iter().flatten().collect())
    }

    async fn collect_channel(&self, channel_id: &str) -> PipelineResult<Vec<PlaylistRecord>> {
        let request = ListRequest::new(Resource::Playlists, PLAYLIST_PARTS)
            .filter("channelId", channel_id)
            .max_results(self.page_size);

        let mut records = Vec::new();
        let mut stream = pin!(pages(self.api.as_ref(), request.clone()));
        while let Some(items) = stream.try_next().await? {
            for item in items {
                let item: PlaylistItem = decode(&request, item)?;
                records.push(item.into_record(channel_id));
            }
        }

        info!("Fetched {} playlists for channel {channel_id}.", records.len());
        Ok(records)
    }
}
