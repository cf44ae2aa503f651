//! Periodic snapshots of YouTube channel, playlist and video statistics,
//! extracted through the Data API v3 and loaded into an analytics store.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
pub mod youtube;

use crate::services::snapshot_service::SnapshotService;
use rocket::{routes, Build, Rocket};
use std::sync::Arc;

pub struct AppState {
    pub snapshots: Arc<SnapshotService>,
    pub admin_token: Option<String>,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build().manage(state).mount(
        "/",
        routes![
            api::health,
            api::snapshot_status,
            api::trigger_snapshot
        ],
    )
}
