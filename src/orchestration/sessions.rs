//! Accrual session manager: the Idle -> Holding -> Idle state machine.
//!
//! At most one holding session exists per player. While holding, a spawned
//! driver task applies one engine tick per period; in-flight energy is
//! persisted every `flush_every_ticks` ticks (write coalescing) and the
//! accrued reward is flushed into the balance exactly once, at release.
//! Releasing aborts the driver first, so no further mutation happens once
//! the player lets go.

use crate::clock::Clock;
use crate::config::{Config, CooldownPolicy};
use crate::db::Repository;
use crate::domain::{Amount, PlayerId, PlayerRecord};
use crate::engine::energy::{begin_cooldown, cooldown_active, refresh_energy};
use crate::engine::session::{apply_tick, settle, SessionProgress, TickOutcome};
use crate::orchestration::{mutate_player, GameError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Snapshot of a holding session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub reward: Amount,
    pub energy: i64,
    pub ticks: u32,
}

/// Result of settling a session.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub reward: Amount,
    pub record: PlayerRecord,
}

struct ActiveSession {
    /// Working copy; authoritative for energy while the session is held.
    record: PlayerRecord,
    progress: SessionProgress,
    ticks_since_flush: u32,
    driver: Option<JoinHandle<()>>,
}

pub struct SessionManager {
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
    config: Config,
    active: Mutex<HashMap<PlayerId, ActiveSession>>,
}

impl SessionManager {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            repo,
            clock,
            config,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Idle -> Holding.
    ///
    /// Guarded by `energy > 0` and an elapsed cooldown; an elapsed cooldown
    /// window also refills energy here. A second start while already
    /// holding is a no-op returning the running session's view.
    pub async fn start(self: &Arc<Self>, player: &PlayerId) -> Result<SessionView, GameError> {
        let mut active = self.active.lock().await;
        if let Some(session) = active.get(player) {
            return Ok(view_of(session));
        }

        let now = self.clock.now_ms();
        let (record, _) = mutate_player(&self.repo, player, |record| {
            refresh_energy(record, now);
            if cooldown_active(record, now) {
                return Err(GameError::CooldownActive);
            }
            if record.energy == 0 {
                return Err(GameError::EnergyExhausted);
            }
            Ok(())
        })
        .await?;

        let session = ActiveSession {
            record,
            progress: SessionProgress::new(),
            ticks_since_flush: 0,
            driver: None,
        };
        let view = view_of(&session);
        active.insert(player.clone(), session);

        let manager = Arc::clone(self);
        let player_id = player.clone();
        let tick_ms = self.config.tick_ms;
        let driver = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
            // A tokio interval's first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                match manager.tick(&player_id).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        warn!(player = %player_id, error = %e, "session tick failed, stopping driver");
                        break;
                    }
                }
            }
        });

        if let Some(session) = active.get_mut(player) {
            session.driver = Some(driver);
        }

        info!(player = %player, "accrual session started");
        Ok(view)
    }

    /// Apply one accrual tick. Returns whether the session is still holding.
    ///
    /// Called by the driver task; also callable directly, which is what
    /// deterministic tests do.
    pub async fn tick(&self, player: &PlayerId) -> Result<bool, GameError> {
        let mut active = self.active.lock().await;

        let outcome = match active.get_mut(player) {
            None => return Ok(false),
            Some(session) => {
                let outcome = apply_tick(&mut session.record, &mut session.progress);
                session.ticks_since_flush += 1;
                outcome
            }
        };

        match outcome {
            TickOutcome::Holding => {
                if let Some(session) = active.get_mut(player) {
                    if session.ticks_since_flush >= self.config.flush_every_ticks {
                        session.ticks_since_flush = 0;
                        let energy = session.record.energy;
                        let (fresh, _) = mutate_player(&self.repo, player, |record| {
                            record.energy = energy;
                            Ok(())
                        })
                        .await?;
                        // Pick up concurrent credits (logins, referrals) so
                        // settlement applies the reward to current state.
                        session.record = fresh;
                    }
                }
                Ok(true)
            }
            TickOutcome::Exhausted => {
                // Force-close; the exhausting tick's reward still pays out.
                if let Some(session) = active.remove(player) {
                    self.finish(session, true).await?;
                }
                Ok(false)
            }
        }
    }

    /// Holding -> Idle on explicit release.
    ///
    /// Returns None (a no-op) when no session is holding, which also covers
    /// the race where exhaustion force-closed it first.
    pub async fn release(&self, player: &PlayerId) -> Result<Option<ReleaseOutcome>, GameError> {
        let mut active = self.active.lock().await;
        let Some(mut session) = active.remove(player) else {
            return Ok(None);
        };

        // Stop the timer before settling: no further ticks once released.
        if let Some(driver) = session.driver.take() {
            driver.abort();
        }

        let outcome = self.finish(session, false).await?;
        Ok(Some(outcome))
    }

    /// The running session for a player, if any.
    pub async fn view(&self, player: &PlayerId) -> Option<SessionView> {
        let active = self.active.lock().await;
        active.get(player).map(view_of)
    }

    /// Settle a closed session: flush the reward into the balance once and
    /// open the cooldown window per policy.
    async fn finish(
        &self,
        session: ActiveSession,
        exhausted: bool,
    ) -> Result<ReleaseOutcome, GameError> {
        let now = self.clock.now_ms();
        let reward = session.progress.reward;
        let energy = session.record.energy;
        let progress = session.progress;
        let cooldown_ms = self.config.cooldown_ms;
        let start_cooldown =
            exhausted || self.config.cooldown_policy == CooldownPolicy::Release;

        let (record, _) = mutate_player(&self.repo, &session.record.id, |record| {
            record.energy = energy;
            settle(record, &progress, now);
            if start_cooldown {
                begin_cooldown(record, now, cooldown_ms, exhausted);
            }
            Ok(())
        })
        .await?;

        info!(
            player = %record.id,
            reward = %reward,
            exhausted,
            "accrual session settled"
        );
        Ok(ReleaseOutcome { reward, record })
    }
}

fn view_of(session: &ActiveSession) -> SessionView {
    SessionView {
        reward: session.progress.reward,
        energy: session.record.energy,
        ticks: session.progress.ticks,
    }
}
