use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Amount, PlayerId, PlayerRecord};
use crate::error::AppError;
use crate::orchestration::GameError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPlayerBody {
    pub init_data: Option<String>,
    /// Invite parameter forwarded by the client on first contact.
    pub referrer_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPlayerResponse {
    pub message: String,
    pub player_data: PlayerRecord,
}

pub async fn init_player(
    State(state): State<AppState>,
    Json(body): Json<InitPlayerBody>,
) -> Result<Json<InitPlayerResponse>, AppError> {
    let init_data = body
        .init_data
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing initData".into()))?;

    let user = state.validator.validate(&init_data).await?;
    let mut record = state.onboarding.init_player(&user).await?;

    // An invite parameter registers the referral as part of first contact.
    // Registration failures must not fail initialization itself.
    if let Some(referrer) = body.referrer_id.filter(|s| !s.is_empty()) {
        let referred = user.player_id();
        match state
            .ledger
            .register(&referred, &PlayerId::new(referrer))
            .await
        {
            Ok(_) => {
                if let Some(updated) = state.repo.get_player(&referred).await? {
                    record = updated;
                }
            }
            Err(GameError::SelfReferral) => {
                tracing::warn!(player = %referred, "ignoring self-referral in initPlayer");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Json(InitPlayerResponse {
        message: "Player data initialized".to_string(),
        player_data: record,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub player_data: PlayerRecord,
}

pub async fn get_player(
    Query(params): Query<PlayerQuery>,
    State(state): State<AppState>,
) -> Result<Json<PlayerResponse>, AppError> {
    let id = PlayerId::new(params.user_id);
    let record = state
        .repo
        .get_player(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown player: {}", id)))?;

    Ok(Json(PlayerResponse {
        player_data: record,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLoginBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLoginResponse {
    pub applied: bool,
    pub streak: i64,
    pub reward: Amount,
    pub balance: Amount,
}

pub async fn daily_login(
    State(state): State<AppState>,
    Json(body): Json<DailyLoginBody>,
) -> Result<Json<DailyLoginResponse>, AppError> {
    let user_id = body
        .user_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing userId".into()))?;

    let (outcome, record) = state
        .onboarding
        .daily_login(&PlayerId::new(user_id))
        .await?;

    Ok(Json(DailyLoginResponse {
        applied: outcome.applied,
        streak: outcome.streak,
        reward: outcome.reward,
        balance: record.balance,
    }))
}
