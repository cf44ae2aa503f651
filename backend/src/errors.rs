//! Error types for the snapshot pipeline.

use crate::models::PipelineStage;
use crate::youtube::{ListRequest, Resource};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A list call against the API failed; never retried.
    #[error("{call} failed ({context}): {source}")]
    UpstreamCall {
        call: Resource,
        context: String,
        #[source]
        source: BoxError,
    },

    /// A requested channel id matched nothing. Recovered by skipping the id.
    #[error("no channel found for id {channel_id}")]
    EmptyResult { channel_id: String },

    #[error("malformed {resource} item: {source}")]
    MalformedItem {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load table {table}: {message}")]
    Load { table: String, message: String },

    #[error("a snapshot run is already in progress")]
    AlreadyRunning,

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl PipelineError {
    pub fn upstream(request: &ListRequest, source: impl Into<BoxError>) -> Self {
        PipelineError::UpstreamCall {
            call: request.resource,
            context: request.describe(),
            source: source.into(),
        }
    }

    pub fn malformed(resource: Resource, source: serde_json::Error) -> Self {
        PipelineError::MalformedItem { resource, source }
    }

    pub fn load(table: &str, message: impl ToString) -> Self {
        PipelineError::Load {
            table: table.to_string(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Configuration {
            message: message.into(),
        }
    }
}

/// A pipeline failure together with the stage that was running.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: PipelineStage,
    #[source]
    pub source: PipelineError,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_upstream_error_keeps_call_context_and_cause() {
        let request = ListRequest::new(Resource::Videos, "snippet,statistics").filter("id", "V1,V2");
        let err = PipelineError::upstream(&request, anyhow::anyhow!("quotaExceeded"));

        assert_eq!(
            err.to_string(),
            "videos.list failed (part=snippet,statistics id=V1,V2): quotaExceeded"
        );
        assert_eq!(err.source().map(|s| s.to_string()), Some("quotaExceeded".to_string()));
    }

    #[test]
    fn test_stage_error_display() {
        let err = StageError {
            stage: PipelineStage::Playlists,
            source: PipelineError::AlreadyRunning,
        };
        assert_eq!(
            err.to_string(),
            "playlists stage failed: a snapshot run is already in progress"
        );
    }
}
