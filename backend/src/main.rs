use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;
use yt_analytics::config::{init_logger, load_environment, setup_snapshot_scheduler, Config};
use yt_analytics::services::snapshot_service::SnapshotService;
use yt_analytics::{build_rocket, AppState};

#[derive(Parser)]
#[command(name = "yt-analytics", about = "YouTube channel/playlist/video snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Take one snapshot and exit
    Run,
    /// Serve the status API and take scheduled snapshots
    Serve,
}

#[rocket::main]
async fn main() -> Result<()> {
    load_environment();
    init_logger();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let snapshots = Arc::new(SnapshotService::from_config(&config)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Run => {
            let report = snapshots.run_snapshot().await?;
            info!(
                "All data fetched and saved successfully: {} channels, {} playlists, {} videos",
                report.channels, report.playlists, report.videos
            );
        }
        Command::Serve => {
            // Dropping the scheduler would stop its jobs.
            let _scheduler = match &config.snapshot_schedule {
                Some(schedule) => Some(setup_snapshot_scheduler(schedule, snapshots.clone()).await?),
                None => None,
            };

            let state = AppState {
                snapshots,
                admin_token: config.admin_token.clone(),
            };
            let _ = build_rocket(state).launch().await?;
        }
    }

    Ok(())
}
