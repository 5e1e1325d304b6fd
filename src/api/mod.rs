pub mod health;
pub mod players;
pub mod referrals;
pub mod sessions;
pub mod tasks;

use crate::auth::InitDataValidator;
use crate::db::Repository;
use crate::orchestration::{Onboarding, ReferralLedger, SessionManager, TaskBoard};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub validator: Arc<dyn InitDataValidator>,
    pub onboarding: Arc<Onboarding>,
    pub ledger: Arc<ReferralLedger>,
    pub sessions: Arc<SessionManager>,
    pub tasks: Arc<TaskBoard>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        validator: Arc<dyn InitDataValidator>,
        onboarding: Arc<Onboarding>,
        ledger: Arc<ReferralLedger>,
        sessions: Arc<SessionManager>,
        tasks: Arc<TaskBoard>,
    ) -> Self {
        Self {
            repo,
            validator,
            onboarding,
            ledger,
            sessions,
            tasks,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/initPlayer", post(players::init_player))
        .route(
            "/referrals",
            post(referrals::register_referral).get(referrals::get_referrals),
        )
        .route("/v1/referrals/claim", post(referrals::claim_referral_bonus))
        .route("/v1/player", get(players::get_player))
        .route("/v1/dailyLogin", post(players::daily_login))
        .route("/v1/sessions", get(sessions::get_session))
        .route("/v1/sessions/start", post(sessions::start_session))
        .route("/v1/sessions/release", post(sessions::release_session))
        .route("/v1/tasks", get(tasks::get_tasks))
        .route("/v1/tasks/start", post(tasks::start_task))
        .route("/v1/tasks/complete", post(tasks::complete_task))
        .layer(cors)
        .with_state(state)
}
