//! Pure computation engines for the game's bookkeeping rules.
//!
//! Everything here is deterministic state-in/state-out logic; persistence
//! and timers live in the orchestration layer.

pub mod daily;
pub mod energy;
pub mod referral;
pub mod session;

pub use daily::{check_daily_login, DailyLoginOutcome};
pub use energy::{begin_cooldown, can_start_session, cooldown_active, refresh_energy};
pub use session::{apply_tick, settle, SessionProgress, TickOutcome};
