use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Amount, PlayerId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub holding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<u32>,
}

fn body_user_id(body: SessionBody) -> Result<PlayerId, AppError> {
    body.user_id
        .filter(|s| !s.is_empty())
        .map(PlayerId::new)
        .ok_or_else(|| AppError::BadRequest("Missing userId".into()))
}

pub async fn start_session(
    State(state): State<AppState>,
    Json(body): Json<SessionBody>,
) -> Result<Json<SessionResponse>, AppError> {
    let player = body_user_id(body)?;
    let view = state.sessions.start(&player).await?;

    Ok(Json(SessionResponse {
        holding: true,
        reward: Some(view.reward),
        energy: Some(view.energy),
        ticks: Some(view.ticks),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResponse {
    /// False when no session was holding (safe no-op).
    pub released: bool,
    pub reward: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_end_time: Option<i64>,
}

pub async fn release_session(
    State(state): State<AppState>,
    Json(body): Json<SessionBody>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let player = body_user_id(body)?;

    match state.sessions.release(&player).await? {
        Some(outcome) => Ok(Json(ReleaseResponse {
            released: true,
            reward: outcome.reward,
            balance: Some(outcome.record.balance),
            energy: Some(outcome.record.energy),
            cooldown_end_time: outcome.record.cooldown_end_time.map(|t| t.as_ms()),
        })),
        None => Ok(Json(ReleaseResponse {
            released: false,
            reward: Amount::zero(),
            balance: None,
            energy: None,
            cooldown_end_time: None,
        })),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub user_id: String,
}

pub async fn get_session(
    Query(params): Query<SessionQuery>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let player = PlayerId::new(params.user_id);

    match state.sessions.view(&player).await {
        Some(view) => Ok(Json(SessionResponse {
            holding: true,
            reward: Some(view.reward),
            energy: Some(view.energy),
            ticks: Some(view.ticks),
        })),
        None => Ok(Json(SessionResponse {
            holding: false,
            reward: None,
            energy: None,
            ticks: None,
        })),
    }
}
