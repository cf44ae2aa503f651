use crate::errors::{PipelineError, PipelineResult};
use crate::models::ChannelRecord;
use crate::services::paginator::{decode, pages};
use crate::youtube::items::ChannelItem;
use crate::youtube::{ListRequest, Resource, YouTubeApi};
use futures::TryStreamExt;
use log::{info, warn};
use std::pin::pin;
use std::sync::Arc;

const CHANNEL_PARTS: &str = "snippet,contentDetails,statistics";

/// Resolves channel ids into summary rows.
pub struct ChannelCollector {
    api: Arc<dyn YouTubeApi>,
}

impl ChannelCollector {
    pub fn new(api: Arc<dyn YouTubeApi>) -> Self {
        Self { api }
    }

    /// One row per resolvable id, in input order. Ids the API does not know
    /// are logged and skipped; duplicates are kept.
    pub async fn collect(&self, channel_ids: &[String]) -> PipelineResult<Vec<ChannelRecord>> {
        let mut records = Vec::with_capacity(channel_ids.len());

        for channel_id in channel_ids {
            match self.fetch_channel(channel_id).await {
                Ok(record) => {
                    info!(
                        "Channel data fetched successfully for {} ({})",
                        record.channel_name, record.channel_id
                    );
                    records.push(record);
                }
                Err(PipelineError::EmptyResult { channel_id }) => {
                    warn!("No channel data found for {channel_id}, skipping.");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }

    async fn fetch_channel(&self, channel_id: &str) -> PipelineResult<ChannelRecord> {
        let request = ListRequest::new(Resource::Channels, CHANNEL_PARTS).filter("id", channel_id);

        let mut stream = pin!(pages(self.api.as_ref(), request.clone()));
        while let Some(items) = stream.try_next().await? {
            if let Some(item) = items.into_iter().next() {
                let item: ChannelItem = decode(&request, item)?;
                return Ok(item.into_record(channel_id));
            }
        }

        Err(PipelineError::EmptyResult {
            channel_id: channel_id.to_string(),
        })
    }
}
