//! Domain types for the game bookkeeping core.
//!
//! This module provides:
//! - Lossless currency handling via the Amount wrapper
//! - Domain primitives: PlayerId, TimeMs, GameDate
//! - PlayerRecord, ReferralRecord and the task template/instance split

pub mod amount;
pub mod player;
pub mod primitives;
pub mod referral;
pub mod task;

pub use amount::Amount;
pub use player::{PlayerProfile, PlayerRecord};
pub use primitives::{GameDate, PlayerId, TimeMs};
pub use referral::ReferralRecord;
pub use task::{TaskInstance, TaskStatus, TaskTemplate};
