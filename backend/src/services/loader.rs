use crate::errors::{PipelineError, PipelineResult};
use crate::models::RecordSets;
use async_trait::async_trait;
use log::info;
use serde::Serialize;
use serde_json::Value;

pub const CHANNEL_TABLE: &str = "channel_data";
pub const PLAYLIST_TABLE: &str = "playlist_data";
pub const VIDEO_TABLE: &str = "video_data";

/// Bulk loader with overwrite semantics: after `load_table` the table holds
/// exactly `rows`, whatever it held before.
#[async_trait]
pub trait RecordLoader: Send + Sync {
    async fn load_table(&self, table: &str, rows: Vec<Value>) -> PipelineResult<usize>;
}

pub fn to_rows<T: Serialize>(table: &str, records: &[T]) -> PipelineResult<Vec<Value>> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).map_err(|e| PipelineError::load(table, e)))
        .collect()
}

/// Hands the three finalized record sets to the loader, channels first.
pub async fn load_record_sets(loader: &dyn RecordLoader, sets: &RecordSets) -> PipelineResult<()> {
    let tables = [
        (CHANNEL_TABLE, to_rows(CHANNEL_TABLE, &sets.channels)?),
        (PLAYLIST_TABLE, to_rows(PLAYLIST_TABLE, &sets.playlists)?),
        (VIDEO_TABLE, to_rows(VIDEO_TABLE, &sets.videos)?),
    ];

    for (table, rows) in tables {
        let loaded = loader.load_table(table, rows).await?;
        info!("Uploaded {loaded} rows to {table}");
    }
    Ok(())
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Keeps loaded tables in memory; optionally refuses one table.
    #[derive(Default)]
    pub struct MemoryLoader {
        pub tables: Mutex<BTreeMap<String, Vec<Value>>>,
        pub loads: Mutex<Vec<String>>,
        pub refuse: Option<String>,
    }

    #[async_trait]
    impl RecordLoader for MemoryLoader {
        async fn load_table(&self, table: &str, rows: Vec<Value>) -> PipelineResult<usize> {
            self.loads.lock().unwrap().push(table.to_string());
            if self.refuse.as_deref() == Some(table) {
                return Err(PipelineError::load(table, "refused"));
            }
            let count = rows.len();
            self.tables.lock().unwrap().insert(table.to_string(), rows);
            Ok(count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryLoader;
    use super::*;
    use crate::models::{ChannelRecord, VideoRecord};
    use chrono::NaiveDate;
    use serde_json::json;

    #[tokio::test]
    async fn test_loads_tables_in_order_and_replaces() {
        let loader = MemoryLoader::default();
        let mut sets = RecordSets::default();
        sets.channels.push(ChannelRecord {
            channel_id: "C1".to_string(),
            channel_name: "One".to_string(),
            subscribers: 1,
            total_views: 2,
            video_count: 3,
        });

        load_record_sets(&loader, &sets).await.unwrap();
        load_record_sets(&loader, &sets).await.unwrap();

        assert_eq!(
            *loader.loads.lock().unwrap(),
            vec![CHANNEL_TABLE, PLAYLIST_TABLE, VIDEO_TABLE, CHANNEL_TABLE, PLAYLIST_TABLE, VIDEO_TABLE]
        );
        let tables = loader.tables.lock().unwrap();
        assert_eq!(tables[CHANNEL_TABLE].len(), 1);
        assert!(tables[VIDEO_TABLE].is_empty());
    }

    #[test]
    fn test_video_rows_serialize_naive_dates() {
        let video = VideoRecord {
            video_id: "V1".to_string(),
            video_title: "Intro".to_string(),
            published_date: NaiveDate::from_ymd_opt(2025, 1, 15).and_then(|d| d.and_hms_opt(12, 0, 0)),
            views: 100,
            likes: 5,
            comments: 1,
            playlist_id: "P1".to_string(),
        };

        let rows = to_rows(VIDEO_TABLE, &[video]).unwrap();
        assert_eq!(
            rows[0],
            json!({
                "video_id": "V1",
                "video_title": "Intro",
                "published_date": "2025-01-15T12:00:00",
                "views": 100,
                "likes": 5,
                "comments": 1,
                "playlist_id": "P1"
            })
        );
    }
}
