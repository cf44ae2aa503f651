use crate::errors::{PipelineError, PipelineResult};
use crate::services::snapshot_service::SnapshotService;
use crate::utils::{parse_timezone, split_list};
use crate::youtube::client::DEFAULT_API_BASE_URL;
use crate::youtube::PLATFORM_MAX_PAGE_SIZE;
use anyhow::Result;
use chrono_tz::Tz;
use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch,
};
use env_logger::{Builder, Env};
use log::{error, info, warn};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";
const DEFAULT_DATASET: &str = "youtube_data";
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Knobs of the extraction pipeline itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub page_size: u32,
    pub detail_batch_size: usize,
    pub fetch_concurrency: usize,
    pub timezone: Tz,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_size: PLATFORM_MAX_PAGE_SIZE,
            detail_batch_size: PLATFORM_MAX_PAGE_SIZE as usize,
            fetch_concurrency: 1,
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarehouseBackend {
    Elasticsearch { url: String },
    Files { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub youtube_api_key: String,
    pub youtube_api_base_url: String,
    pub channel_ids: Vec<String>,
    pub pipeline: PipelineSettings,
    pub warehouse: WarehouseBackend,
    pub dataset: String,
    pub snapshot_schedule: Option<String>,
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let youtube_api_key = var("YOUTUBE_API_KEY")
            .ok_or_else(|| PipelineError::config("YOUTUBE_API_KEY environment variable must be set"))?;

        let channel_ids = split_list(&var("CHANNEL_IDS").unwrap_or_default());
        if channel_ids.is_empty() {
            return Err(PipelineError::config(
                "CHANNEL_IDS must list at least one channel id",
            ));
        }

        let page_size = bounded("PAGE_SIZE", var("PAGE_SIZE"), PLATFORM_MAX_PAGE_SIZE as usize)?;
        let detail_batch_size = bounded(
            "DETAIL_BATCH_SIZE",
            var("DETAIL_BATCH_SIZE"),
            PLATFORM_MAX_PAGE_SIZE as usize,
        )?;
        let fetch_concurrency = match var("FETCH_CONCURRENCY") {
            Some(raw) => parse_positive("FETCH_CONCURRENCY", &raw)?,
            None => 1,
        };
        let timezone = match var("CIVIL_TIMEZONE") {
            Some(name) => parse_timezone(&name)
                .ok_or_else(|| PipelineError::config(format!("unknown CIVIL_TIMEZONE: {name}")))?,
            None => DEFAULT_TIMEZONE,
        };

        let warehouse = match var("WAREHOUSE_BACKEND").as_deref() {
            None | Some("elasticsearch") => WarehouseBackend::Elasticsearch {
                url: var("ELASTICSEARCH_URL").unwrap_or_else(|| DEFAULT_ELASTICSEARCH_URL.to_string()),
            },
            Some("files") => WarehouseBackend::Files {
                dir: PathBuf::from(var("WAREHOUSE_DIR").unwrap_or_else(|| "data".to_string())),
            },
            Some(other) => {
                return Err(PipelineError::config(format!(
                    "unknown WAREHOUSE_BACKEND: {other} (expected elasticsearch or files)"
                )))
            }
        };

        Ok(Config {
            youtube_api_key,
            youtube_api_base_url: var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            channel_ids,
            pipeline: PipelineSettings {
                page_size: page_size as u32,
                detail_batch_size,
                fetch_concurrency,
                timezone,
            },
            warehouse,
            dataset: var("WAREHOUSE_DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            snapshot_schedule: var("SNAPSHOT_SCHEDULE"),
            admin_token: var("ADMIN_TOKEN"),
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> PipelineResult<usize> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(PipelineError::config(format!(
            "{key} must be a positive integer, got {raw}"
        ))),
    }
}

fn bounded(key: &str, raw: Option<String>, max: usize) -> PipelineResult<usize> {
    let Some(raw) = raw else {
        return Ok(max);
    };
    let value = parse_positive(key, &raw)?;
    if value > max {
        warn!("{key}={value} exceeds the platform maximum, using {max}");
        return Ok(max);
    }
    Ok(value)
}

pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting YouTube analytics snapshot service...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_elasticsearch_client(es_url: &str) -> Result<Elasticsearch> {
    info!("Connecting to Elasticsearch at: {es_url}");

    let transport =
        TransportBuilder::new(SingleNodeConnectionPool::new(es_url.parse()?)).build()?;

    Ok(Elasticsearch::new(transport))
}

pub async fn setup_snapshot_scheduler(
    schedule: &str,
    snapshots: Arc<SnapshotService>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let snapshot_job = Job::new_async(schedule, move |_uuid, _l| {
        let snapshots = snapshots.clone();
        Box::pin(async move {
            match snapshots.run_snapshot().await {
                Ok(report) => info!(
                    "Scheduled snapshot finished: {} channels, {} playlists, {} videos",
                    report.channels, report.playlists, report.videos
                ),
                Err(e) => error!("Scheduled snapshot failed: {e}"),
            }
        })
    })?;

    scheduler.add(snapshot_job).await?;
    scheduler.start().await?;
    info!("Snapshot scheduler started ({schedule}).");

    Ok(scheduler)
}
