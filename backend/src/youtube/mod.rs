//! Seam between the collectors and the YouTube Data API v3.
//!
//! Collectors only ever see [`YouTubeApi`]; the HTTP implementation lives in
//! [`client`] and tests swap in a scripted fake.

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod items;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub use client::HttpYouTubeApi;

/// Largest `maxResults` the list endpoints accept, and the largest number of
/// ids a single `videos` lookup resolves.
pub const PLATFORM_MAX_PAGE_SIZE: u32 = 50;

/// The four list operations the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Channels,
    Playlists,
    PlaylistItems,
    Videos,
}

impl Resource {
    /// Path segment under the API root.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Channels => "channels",
            Resource::Playlists => "playlists",
            Resource::PlaylistItems => "playlistItems",
            Resource::Videos => "videos",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.list", self.path())
    }
}

/// Descriptor of one list call: resource, field projection, filters, page size
/// and cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub resource: Resource,
    pub part: &'static str,
    pub filters: Vec<(&'static str, String)>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

impl ListRequest {
    pub fn new(resource: Resource, part: &'static str) -> Self {
        Self {
            resource,
            part,
            filters: Vec::new(),
            max_results: None,
            page_token: None,
        }
    }

    pub fn filter(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.filters.push((key, value.into()));
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results.clamp(1, PLATFORM_MAX_PAGE_SIZE));
        self
    }

    pub fn page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    /// Filters and cursor rendered for error messages and logs.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self
            .filters
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        if let Some(token) = &self.page_token {
            parts.push(format!("pageToken={token}"));
        }
        format!("part={} {}", self.part, parts.join(" "))
            .trim_end()
            .to_string()
    }
}

/// One page of a list response. Items stay untyped here; the collectors map
/// them through [`items`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ListPage {
    /// Cursor of the next page, treating an empty token like a missing one.
    pub fn next_cursor(&self) -> Option<String> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

/// Capability to issue list calls against the platform.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    async fn list(&self, request: &ListRequest) -> anyhow::Result<ListPage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_request() {
        let request = ListRequest::new(Resource::Playlists, "snippet,contentDetails")
            .filter("channelId", "C1")
            .max_results(50)
            .page_token(Some("CDIQAA".to_string()));

        assert_eq!(
            request.describe(),
            "part=snippet,contentDetails channelId=C1 pageToken=CDIQAA"
        );
        assert_eq!(Resource::PlaylistItems.to_string(), "playlistItems.list");
    }

    #[test]
    fn test_max_results_is_clamped_to_platform_limit() {
        let request = ListRequest::new(Resource::Videos, "snippet").max_results(500);
        assert_eq!(request.max_results, Some(50));
    }

    #[test]
    fn test_list_page_from_response() {
        let page: ListPage = serde_json::from_value(json!({
            "kind": "youtube#playlistListResponse",
            "nextPageToken": "",
            "items": [{"id": "P1"}]
        }))
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor(), None);

        let empty: ListPage = serde_json::from_value(json!({"pageInfo": {}})).unwrap();
        assert!(empty.items.is_empty());
    }
}
