//! Referral ledger entry.

use crate::domain::{Amount, PlayerId, TimeMs};
use serde::{Deserialize, Serialize};

/// One edge of the referral graph: `referred` was invited by `referrer`.
///
/// `referred_id` is unique in the ledger, so a player has at most one
/// referrer and registration is idempotent under retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub referrer_id: PlayerId,
    pub referred_id: PlayerId,
    /// What the referrer earned from this referral.
    pub scorpions_earned: Amount,
    pub created_time_ms: TimeMs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_record_serialization() {
        let record = ReferralRecord {
            referrer_id: PlayerId::new("u1"),
            referred_id: PlayerId::new("u2"),
            scorpions_earned: Amount::from(100),
            created_time_ms: TimeMs::new(5000),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["referrerId"], "u1");
        assert_eq!(json["referredId"], "u2");
        assert_eq!(json["scorpionsEarned"], 100.0);
    }
}
