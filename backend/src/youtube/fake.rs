//! Scripted in-memory [`YouTubeApi`] used by the collector and service tests.

use super::{ListPage, ListRequest, Resource, YouTubeApi};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

type Key = (Resource, String, Option<String>);

/// Responds to list calls from a table keyed by resource, primary filter value
/// and cursor. Unscripted calls answer with an empty page; scripted failures
/// answer with an error. Every call is recorded.
#[derive(Default)]
pub struct FakeYouTubeApi {
    pages: Mutex<HashMap<Key, ListPage>>,
    failures: Mutex<HashMap<Key, String>>,
    calls: Mutex<Vec<ListRequest>>,
}

impl FakeYouTubeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(
        self,
        resource: Resource,
        filter_value: &str,
        cursor: Option<&str>,
        items: Vec<Value>,
        next: Option<&str>,
    ) -> Self {
        self.pages.lock().unwrap().insert(
            (resource, filter_value.to_string(), cursor.map(str::to_string)),
            ListPage {
                items,
                next_page_token: next.map(str::to_string),
            },
        );
        self
    }

    pub fn fail(
        self,
        resource: Resource,
        filter_value: &str,
        cursor: Option<&str>,
        message: &str,
    ) -> Self {
        self.failures.lock().unwrap().insert(
            (resource, filter_value.to_string(), cursor.map(str::to_string)),
            message.to_string(),
        );
        self
    }

    /// Scripts a channel lookup returning one channel.
    pub fn channel(self, id: &str, title: &str, subscribers: u64) -> Self {
        let item = json!({
            "id": id,
            "snippet": {"title": title},
            "statistics": {
                "subscriberCount": subscribers.to_string(),
                "viewCount": "1000",
                "videoCount": "10"
            }
        });
        self.page(Resource::Channels, id, None, vec![item], None)
    }

    /// Scripts playlist membership pages of `page_size`, and answers every
    /// `videos` batch lookup the pipeline would issue for them.
    pub fn playlist_videos(self, playlist_id: &str, video_ids: &[String], page_size: usize) -> Self {
        let chunks: Vec<&[String]> = video_ids.chunks(page_size).collect();
        let mut api = self;
        for (index, chunk) in chunks.iter().enumerate() {
            let cursor = (index > 0).then(|| format!("{playlist_id}-page-{index}"));
            let next = (index + 1 < chunks.len()).then(|| format!("{playlist_id}-page-{}", index + 1));
            let items = chunk
                .iter()
                .map(|id| json!({"contentDetails": {"videoId": id}}))
                .collect();
            api = api.page(
                Resource::PlaylistItems,
                playlist_id,
                cursor.as_deref(),
                items,
                next.as_deref(),
            );
        }
        for batch in video_ids.chunks(50) {
            let items = batch.iter().map(|id| video_json(id)).collect();
            api = api.page(Resource::Videos, &batch.join(","), None, items, None);
        }
        api
    }

    pub fn calls(&self) -> Vec<ListRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, resource: Resource) -> Vec<ListRequest> {
        self.calls()
            .into_iter()
            .filter(|call| call.resource == resource)
            .collect()
    }
}

pub fn video_json(id: &str) -> Value {
    json!({
        "id": id,
        "snippet": {"title": format!("Video {id}"), "publishedAt": "2025-01-15T17:00:00Z"},
        "statistics": {"viewCount": "100", "likeCount": "5", "commentCount": "1"}
    })
}

pub fn video_ids(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i:03}")).collect()
}

#[async_trait]
impl YouTubeApi for FakeYouTubeApi {
    async fn list(&self, request: &ListRequest) -> anyhow::Result<ListPage> {
        self.calls.lock().unwrap().push(request.clone());

        let filter_value = request
            .filters
            .first()
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let key = (request.resource, filter_value, request.page_token.clone());

        if let Some(message) = self.failures.lock().unwrap().get(&key) {
            return Err(anyhow::anyhow!(message.clone()));
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}
