//! Services coordinating the pure engines with the repository.
//!
//! Every player mutation goes through [`mutate_player`], a bounded
//! optimistic-retry loop over the repository's compare-and-swap update, so
//! a racing writer surfaces as a conflict instead of a lost update.

pub mod onboarding;
pub mod referrals;
pub mod sessions;
pub mod tasks;

pub use onboarding::Onboarding;
pub use referrals::{ClaimOutcome, ReferralLedger, ReferralListing, RegisterOutcome};
pub use sessions::{ReleaseOutcome, SessionManager, SessionView};
pub use tasks::{CompleteOutcome, TaskBoard, TaskView};

use crate::db::Repository;
use crate::domain::{PlayerId, PlayerRecord};
use thiserror::Error;

/// How many times a read-modify-write is retried after losing a CAS race.
const MAX_CAS_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("players cannot refer themselves")]
    SelfReferral,
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("unknown task: {0}")]
    UnknownTask(i64),
    #[error("cooldown is still active")]
    CooldownActive,
    #[error("energy is exhausted")]
    EnergyExhausted,
    #[error("{0}")]
    RequirementNotMet(String),
    #[error("concurrent update conflict, try again")]
    Conflict,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Read-modify-write a player record under the CAS guard.
///
/// `mutate` may run more than once (on a lost race it is re-applied to a
/// fresh read), so it must be a pure function of the record it is given.
/// Returns the record as written plus whatever `mutate` produced.
pub(crate) async fn mutate_player<T, F>(
    repo: &Repository,
    id: &PlayerId,
    mut mutate: F,
) -> Result<(PlayerRecord, T), GameError>
where
    F: FnMut(&mut PlayerRecord) -> Result<T, GameError>,
{
    for attempt in 0..MAX_CAS_RETRIES {
        let mut record = repo
            .get_player(id)
            .await?
            .ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;

        let value = mutate(&mut record)?;

        if repo.update_player_cas(&record).await? {
            record.version += 1;
            return Ok((record, value));
        }

        tracing::debug!(player = %id, attempt, "lost CAS race, re-reading");
    }

    Err(GameError::Conflict)
}
