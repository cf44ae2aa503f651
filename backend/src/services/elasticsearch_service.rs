use crate::errors::{PipelineError, PipelineResult};
use crate::services::loader::{RecordLoader, CHANNEL_TABLE, PLAYLIST_TABLE, VIDEO_TABLE};
use async_trait::async_trait;
use elasticsearch::http::request::JsonBody;
use elasticsearch::indices::{IndicesCreateParts, IndicesDeleteParts};
use elasticsearch::params::Refresh;
use elasticsearch::{BulkParts, Elasticsearch};
use log::{error, info};
use serde_json::{json, Value};

const BULK_CHUNK_SIZE: usize = 500;

/// Loads record sets into one index per table, replacing the index on every
/// load.
pub struct ElasticsearchLoader {
    es_client: Elasticsearch,
    dataset: String,
}

impl ElasticsearchLoader {
    pub fn new(es_client: Elasticsearch, dataset: impl Into<String>) -> Self {
        Self {
            es_client,
            dataset: dataset.into(),
        }
    }

    pub fn index_name(&self, table: &str) -> String {
        format!("{}_{}", self.dataset, table).to_lowercase()
    }

    async fn recreate_index(&self, table: &str, index: &str) -> PipelineResult<()> {
        let response = self
            .es_client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| PipelineError::load(table, e))?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let response_text = response.text().await.unwrap_or_default();
            error!("Failed to delete Elasticsearch index '{index}': {response_text}");
            return Err(PipelineError::load(table, response_text));
        }

        let response = self
            .es_client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(index_mappings(table))
            .send()
            .await
            .map_err(|e| PipelineError::load(table, e))?;

        if !response.status_code().is_success() {
            let response_text = response.text().await.unwrap_or_default();
            error!("Failed to create Elasticsearch index '{index}': {response_text}");
            return Err(PipelineError::load(table, response_text));
        }

        info!("Elasticsearch index '{index}' created.");
        Ok(())
    }
}

#[async_trait]
impl RecordLoader for ElasticsearchLoader {
    async fn load_table(&self, table: &str, rows: Vec<Value>) -> PipelineResult<usize> {
        let index = self.index_name(table);
        self.recreate_index(table, &index).await?;

        let total = rows.len();
        for chunk in rows.chunks(BULK_CHUNK_SIZE) {
            let response = self
                .es_client
                .bulk(BulkParts::Index(&index))
                .refresh(Refresh::True)
                .body(bulk_body(chunk))
                .send()
                .await
                .map_err(|e| PipelineError::load(table, e))?;

            if !response.status_code().is_success() {
                let response_text = response.text().await.unwrap_or_default();
                return Err(PipelineError::load(table, response_text));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| PipelineError::load(table, e))?;
            if let Some(reason) = first_bulk_error(&body) {
                error!("Bulk load into '{index}' reported errors: {reason}");
                return Err(PipelineError::load(table, reason));
            }
        }

        info!("Uploaded {total} documents to Elasticsearch index '{index}'");
        Ok(total)
    }
}

/// Alternating action/source lines; ids are left to Elasticsearch since a
/// table may legitimately hold repeated keys.
pub fn bulk_body(rows: &[Value]) -> Vec<JsonBody<Value>> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        body.push(json!({"index": {}}).into());
        body.push(row.clone().into());
    }
    body
}

pub fn first_bulk_error(response: &Value) -> Option<String> {
    if !response["errors"].as_bool().unwrap_or(false) {
        return None;
    }
    response["items"]
        .as_array()
        .into_iter()
        .flatten()
        .find_map(|item| {
            let error = &item["index"]["error"];
            (!error.is_null()).then(|| {
                error["reason"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string())
            })
        })
        .or_else(|| Some("bulk request reported errors".to_string()))
}

pub fn index_mappings(table: &str) -> Value {
    let properties = match table {
        CHANNEL_TABLE => json!({
            "channel_id": { "type": "keyword" },
            "channel_name": { "type": "text", "fields": { "raw": { "type": "keyword" } } },
            "subscribers": { "type": "long" },
            "total_views": { "type": "long" },
            "video_count": { "type": "long" }
        }),
        PLAYLIST_TABLE => json!({
            "playlist_id": { "type": "keyword" },
            "playlist_title": { "type": "text", "fields": { "raw": { "type": "keyword" } } },
            "channel_id": { "type": "keyword" },
            "video_count": { "type": "long" }
        }),
        VIDEO_TABLE => json!({
            "video_id": { "type": "keyword" },
            "video_title": { "type": "text", "fields": { "raw": { "type": "keyword" } } },
            "published_date": { "type": "date", "format": "strict_date_optional_time" },
            "views": { "type": "long" },
            "likes": { "type": "long" },
            "comments": { "type": "long" },
            "playlist_id": { "type": "keyword" }
        }),
        _ => json!({}),
    };

    json!({ "mappings": { "properties": properties } })
}
