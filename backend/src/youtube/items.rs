//! Typed views of the list-response items the pipeline reads, and their
//! mapping into warehouse records.
//!
//! Statistics arrive as decimal strings (`"viewCount": "1234"`) while
//! `itemCount` is a JSON number; [`count`] accepts both and maps anything
//! absent or unreadable to 0.

use crate::models::{ChannelRecord, PlaylistRecord, VideoRecord};
use crate::utils::to_civil_naive;
use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(default, deserialize_with = "count::deserialize")]
    pub subscriber_count: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub video_count: u64,
}

impl ChannelItem {
    /// `requested_id` is kept rather than the returned id so the row matches
    /// the configured input exactly.
    pub fn into_record(self, requested_id: &str) -> ChannelRecord {
        ChannelRecord {
            channel_id: requested_id.to_string(),
            channel_name: self.snippet.title,
            subscribers: self.statistics.subscriber_count,
            total_views: self.statistics.view_count,
            video_count: self.statistics.video_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub content_details: PlaylistContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContentDetails {
    #[serde(default, deserialize_with = "count::deserialize")]
    pub item_count: u64,
}

impl PlaylistItem {
    pub fn into_record(self, channel_id: &str) -> PlaylistRecord {
        PlaylistRecord {
            playlist_id: self.id,
            playlist_title: self.snippet.title,
            channel_id: channel_id.to_string(),
            video_count: self.content_details.item_count,
        }
    }
}

/// Membership row of `playlistItems.list`; only the video id matters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistMembership {
    #[serde(default)]
    pub content_details: MembershipContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipContentDetails {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "count::deserialize")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub comment_count: u64,
}

impl VideoItem {
    pub fn into_record(self, playlist_id: &str, tz: Tz) -> VideoRecord {
        VideoRecord {
            video_id: self.id,
            video_title: self.snippet.title,
            published_date: self
                .snippet
                .published_at
                .as_deref()
                .and_then(|published_at| to_civil_naive(published_at, tz)),
            views: self.statistics.view_count,
            likes: self.statistics.like_count,
            comments: self.statistics.comment_count,
            playlist_id: playlist_id.to_string(),
        }
    }
}

pub mod count {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Raw::Number(n)) => n,
            Some(Raw::Text(text)) => text.trim().parse().unwrap_or(0),
            Some(Raw::Other(_)) | None => 0,
        })
    }
}
