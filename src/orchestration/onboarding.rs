//! Player initialization and the daily login reward.

use crate::auth::TelegramUser;
use crate::clock::Clock;
use crate::db::Repository;
use crate::domain::{PlayerId, PlayerRecord};
use crate::engine::daily::{check_daily_login, DailyLoginOutcome};
use crate::orchestration::{mutate_player, GameError};
use std::sync::Arc;

/// Creates player records on first contact and processes logins.
pub struct Onboarding {
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
}

impl Onboarding {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Upsert the identity-provider profile, creating the game record when
    /// this identity is seen for the first time.
    ///
    /// Idempotent: repeated calls refresh profile fields and never touch
    /// balance, energy or streak state.
    pub async fn init_player(&self, user: &TelegramUser) -> Result<PlayerRecord, GameError> {
        let id = user.player_id();
        let now = self.clock.now_ms();

        self.repo.upsert_profile(&id, &user.profile(), now).await?;

        self.repo
            .get_player(&id)
            .await?
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Process the daily login reward for today.
    ///
    /// Idempotent per calendar day; the second call on the same day
    /// reports `applied: false` and changes nothing.
    pub async fn daily_login(
        &self,
        id: &PlayerId,
    ) -> Result<(DailyLoginOutcome, PlayerRecord), GameError> {
        let today = self.clock.today();
        let (record, outcome) =
            mutate_player(&self.repo, id, |record| Ok(check_daily_login(record, today))).await?;
        Ok((outcome, record))
    }
}
