//! Hold-to-earn accrual session: tick accumulation and settlement.

use crate::domain::{Amount, PlayerRecord, TimeMs};
use crate::engine::energy::ENERGY_STEP;

/// Reward accumulated by an open session. Lives only while the session
/// is held; the balance sees it once, at settlement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionProgress {
    pub reward: Amount,
    pub ticks: u32,
}

impl SessionProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of applying one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Energy remains; the session keeps going.
    Holding,
    /// Energy hit 0; the session must force-close.
    Exhausted,
}

/// Apply one accrual tick: spend one energy step, earn `mining_level`.
///
/// The reward-per-tick is flat `mining_level` (+1 per tick at level 1);
/// callers must not tick a record whose energy is already 0.
pub fn apply_tick(record: &mut PlayerRecord, progress: &mut SessionProgress) -> TickOutcome {
    record.energy = (record.energy - ENERGY_STEP).max(0);
    progress.reward += Amount::from(record.mining_level);
    progress.ticks += 1;

    if record.energy == 0 {
        TickOutcome::Exhausted
    } else {
        TickOutcome::Holding
    }
}

/// Flush the accrued reward into the spendable balance.
///
/// Called exactly once per session, on manual release or automatic
/// force-release; a session closed at energy 0 still pays out here.
pub fn settle(record: &mut PlayerRecord, progress: &SessionProgress, now: TimeMs) {
    record.balance += progress.reward;
    record.last_harvest_time = now;
}
