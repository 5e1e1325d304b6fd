//! Energy depletion, refill and cooldown windows.

use crate::domain::{PlayerRecord, TimeMs};

/// Energy ceiling; a fresh or refilled player holds this much.
pub const MAX_ENERGY: i64 = 100;

/// Energy spent per accrual tick.
pub const ENERGY_STEP: i64 = 1;

/// True while the cooldown window is still open.
pub fn cooldown_active(record: &PlayerRecord, now: TimeMs) -> bool {
    matches!(record.cooldown_end_time, Some(end) if end.as_ms() > now.as_ms())
}

/// Refill energy once an elapsed cooldown window is observed.
///
/// Only a record that went through a cooldown refills; a session released
/// early (no cooldown set) keeps its remaining energy. Callers must not
/// invoke this while a session is being held. Returns whether the record
/// changed.
pub fn refresh_energy(record: &mut PlayerRecord, now: TimeMs) -> bool {
    match record.cooldown_end_time {
        Some(end) if end.as_ms() <= now.as_ms() => {
            record.energy = MAX_ENERGY;
            record.cooldown_end_time = None;
            true
        }
        _ => false,
    }
}

/// Guard for the Idle -> Holding transition.
pub fn can_start_session(record: &PlayerRecord, now: TimeMs) -> bool {
    record.energy > 0 && !cooldown_active(record, now)
}

/// Open a cooldown window ending `cooldown_ms` from now.
///
/// `exhausted` marks windows caused by energy hitting 0, which also
/// stamps `last_exhausted_time`.
pub fn begin_cooldown(record: &mut PlayerRecord, now: TimeMs, cooldown_ms: i64, exhausted: bool) {
    if exhausted {
        record.last_exhausted_time = Some(now);
    }
    record.cooldown_end_time = Some(now.plus_ms(cooldown_ms));
}
