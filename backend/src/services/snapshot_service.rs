use crate::config::{create_elasticsearch_client, Config, WarehouseBackend};
use crate::errors::{PipelineError, SnapshotError};
use crate::models::{RecordSets, RunReport, RunStatus};
use crate::services::elasticsearch_service::ElasticsearchLoader;
use crate::services::file_loader::CsvFileLoader;
use crate::services::loader::{load_record_sets, RecordLoader};
use crate::services::pipeline::Pipeline;
use crate::youtube::{HttpYouTubeApi, YouTubeApi};
use anyhow::Result;
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// One snapshot = full extraction followed by an overwrite load of all three
/// tables. Only one snapshot runs at a time.
pub struct SnapshotService {
    pipeline: Pipeline,
    loader: Arc<dyn RecordLoader>,
    channel_ids: Vec<String>,
    run_lock: Arc<Mutex<()>>,
    last_report: RwLock<Option<RunReport>>,
}

impl SnapshotService {
    pub fn new(pipeline: Pipeline, loader: Arc<dyn RecordLoader>, channel_ids: Vec<String>) -> Self {
        Self {
            pipeline,
            loader,
            channel_ids,
            run_lock: Arc::new(Mutex::new(())),
            last_report: RwLock::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api: Arc<dyn YouTubeApi> = Arc::new(HttpYouTubeApi::new(
            &config.youtube_api_base_url,
            config.youtube_api_key.clone(),
        )?);

        let loader: Arc<dyn RecordLoader> = match &config.warehouse {
            WarehouseBackend::Elasticsearch { url } => Arc::new(ElasticsearchLoader::new(
                create_elasticsearch_client(url)?,
                config.dataset.clone(),
            )),
            WarehouseBackend::Files { dir } => Arc::new(CsvFileLoader::new(dir.join(&config.dataset))),
        };

        Ok(Self::new(
            Pipeline::new(api, &config.pipeline),
            loader,
            config.channel_ids.clone(),
        ))
    }

    /// Claims the single run slot. Hold the guard for the whole run and hand
    /// it to [`SnapshotService::run_claimed`].
    pub fn try_claim(&self) -> Result<OwnedMutexGuard<()>, PipelineError> {
        self.run_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| PipelineError::AlreadyRunning)
    }

    pub async fn last_report(&self) -> Option<RunReport> {
        self.last_report.read().await.clone()
    }

    pub async fn run_snapshot(&self) -> Result<RunReport, SnapshotError> {
        let guard = self.try_claim()?;
        self.run_claimed(guard).await
    }

    pub async fn run_claimed(
        &self,
        _guard: OwnedMutexGuard<()>,
    ) -> Result<RunReport, SnapshotError> {
        let started_at = Utc::now();
        info!("Starting snapshot for {} channels...", self.channel_ids.len());

        let outcome = self.extract_and_load().await;

        let mut report = RunReport {
            started_at,
            finished_at: Utc::now(),
            status: RunStatus::Succeeded,
            failed_stage: None,
            error: None,
            channels: 0,
            playlists: 0,
            videos: 0,
        };
        match &outcome {
            Ok(sets) => {
                report.channels = sets.channels.len();
                report.playlists = sets.playlists.len();
                report.videos = sets.videos.len();
                info!("Snapshot completed successfully.");
            }
            Err(e) => {
                report.status = RunStatus::Failed;
                if let SnapshotError::Stage(stage_error) = e {
                    report.failed_stage = Some(stage_error.stage);
                }
                report.error = Some(e.to_string());
                error!("Snapshot failed: {e}");
            }
        }

        *self.last_report.write().await = Some(report.clone());
        outcome.map(|_| report)
    }

    async fn extract_and_load(&self) -> Result<RecordSets, SnapshotError> {
        let sets = self.pipeline.run(&self.channel_ids).await?;
        load_record_sets(self.loader.as_ref(), &sets).await?;
        Ok(sets)
    }
}
