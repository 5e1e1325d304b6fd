use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Amount, PlayerId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReferralBody {
    pub user_id: Option<String>,
    pub referrer_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterReferralResponse {
    pub success: bool,
}

pub async fn register_referral(
    State(state): State<AppState>,
    Json(body): Json<RegisterReferralBody>,
) -> Result<Json<RegisterReferralResponse>, AppError> {
    let (user_id, referrer_id) = match (
        body.user_id.filter(|s| !s.is_empty()),
        body.referrer_id.filter(|s| !s.is_empty()),
    ) {
        (Some(u), Some(r)) => (u, r),
        _ => return Err(AppError::BadRequest("Missing userId or referrerId".into())),
    };

    // Idempotent: re-registration reports success without re-crediting.
    state
        .ledger
        .register(&PlayerId::new(user_id), &PlayerId::new(referrer_id))
        .await?;

    Ok(Json(RegisterReferralResponse { success: true }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralsQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralsResponse {
    pub referrals: Vec<ReferralDto>,
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDto {
    pub referred_id: String,
    pub scorpions_earned: Amount,
}

pub async fn get_referrals(
    Query(params): Query<ReferralsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ReferralsResponse>, AppError> {
    let listing = state.ledger.list(&PlayerId::new(params.user_id)).await?;

    Ok(Json(ReferralsResponse {
        referrals: listing
            .referrals
            .into_iter()
            .map(|r| ReferralDto {
                referred_id: r.referred_id.as_str().to_string(),
                scorpions_earned: r.scorpions_earned,
            })
            .collect(),
        referrer: listing.referrer.map(|id| id.as_str().to_string()),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub claimed: Amount,
    pub balance: Amount,
}

pub async fn claim_referral_bonus(
    State(state): State<AppState>,
    Json(body): Json<ClaimBody>,
) -> Result<Json<ClaimResponse>, AppError> {
    let user_id = body
        .user_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing userId".into()))?;

    let outcome = state.ledger.claim(&PlayerId::new(user_id)).await?;

    Ok(Json(ClaimResponse {
        claimed: outcome.claimed,
        balance: outcome.record.balance,
    }))
}
