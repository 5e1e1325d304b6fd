//! Player record: the per-identity game state.

use crate::domain::{Amount, GameDate, PlayerId, TimeMs};
use serde::{Deserialize, Serialize};

/// Profile fields mirrored from the identity provider at init time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub is_premium: bool,
}

/// Persistent per-player game state.
///
/// Created on first contact, mutated by accrual ticks, cooldown checks,
/// logins and referral credits; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: PlayerId,
    /// Spendable balance. Never negative.
    pub balance: Amount,
    /// Accumulated-but-unclaimed referral earnings.
    pub referral_bonus: Amount,
    /// Positive multiplier applied to reward-per-tick.
    pub mining_level: i64,
    /// Energy in [0,100]; depletes while a session is held.
    pub energy: i64,
    /// Time of the last settled accrual session.
    pub last_harvest_time: TimeMs,
    /// Set when energy last reached 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_exhausted_time: Option<TimeMs>,
    /// While in the future, no session may start and energy may not refill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_end_time: Option<TimeMs>,
    /// Date of the last processed daily-login reward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_date: Option<GameDate>,
    /// Consecutive-day counter; 0 until the first processed login,
    /// then in [1,30].
    pub login_streak: i64,
    /// Immutable once set (first-write-wins).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<PlayerId>,
    #[serde(flatten)]
    pub profile: PlayerProfile,
    /// Write counter for compare-and-swap updates. Not part of the
    /// client-visible state in any meaningful way, but serialized so the
    /// record round-trips.
    pub version: i64,
}

impl PlayerRecord {
    /// A fresh record for a player seen for the first time.
    pub fn new(id: PlayerId, now: TimeMs) -> Self {
        PlayerRecord {
            id,
            balance: Amount::zero(),
            referral_bonus: Amount::zero(),
            mining_level: 1,
            energy: 100,
            last_harvest_time: now,
            last_exhausted_time: None,
            cooldown_end_time: None,
            last_login_date: None,
            login_streak: 0,
            referrer_id: None,
            profile: PlayerProfile::default(),
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = PlayerRecord::new(PlayerId::new("42"), TimeMs::new(1000));
        assert!(record.balance.is_zero());
        assert_eq!(record.mining_level, 1);
        assert_eq!(record.energy, 100);
        assert_eq!(record.login_streak, 0);
        assert!(record.referrer_id.is_none());
        assert!(record.cooldown_end_time.is_none());
        assert_eq!(record.version, 0);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = PlayerRecord::new(PlayerId::new("42"), TimeMs::new(1000));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("miningLevel").is_some());
        assert!(json.get("lastHarvestTime").is_some());
        // Unset optionals are omitted, not null.
        assert!(json.get("referrerId").is_none());
        assert!(json.get("cooldownEndTime").is_none());
    }
}
