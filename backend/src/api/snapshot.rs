use crate::models::{ErrorResponse, RunReport};
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::serde::json::Json;
use rocket::{get, post, Request, State};
use serde_json::{json, Value};

/// Bearer token matching the configured `ADMIN_TOKEN`.
#[derive(Debug)]
pub struct AdminToken(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(expected) = request
            .rocket()
            .state::<AppState>()
            .and_then(|state| state.admin_token.as_deref())
        else {
            return Outcome::Error((Status::Unauthorized, "Trigger endpoint disabled"));
        };

        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|auth| auth.strip_prefix("Bearer "));

        match token {
            Some(t) if t == expected => Outcome::Success(AdminToken(t.to_string())),
            Some(_) => Outcome::Error((Status::Unauthorized, "Invalid token")),
            None => Outcome::Error((Status::Unauthorized, "Missing token")),
        }
    }
}

#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[get("/snapshot/status")]
pub async fn snapshot_status(state: &State<AppState>) -> Json<Option<RunReport>> {
    Json(state.snapshots.last_report().await)
}

#[post("/snapshot")]
pub async fn trigger_snapshot(
    _token: AdminToken,
    state: &State<AppState>,
) -> Result<Status, ErrorResponse> {
    let guard = state.snapshots.try_claim().map_err(|_| {
        ErrorResponse::new(Status::Conflict, "A snapshot run is already in progress")
    })?;

    let snapshots = state.snapshots.clone();
    tokio::spawn(async move {
        if let Err(e) = snapshots.run_claimed(guard).await {
            error!("Triggered snapshot failed: {e}");
        }
    });
    info!("Snapshot triggered via API.");

    Ok(Status::Accepted)
}
