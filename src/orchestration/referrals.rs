//! Referral ledger service: registration, listing and bonus claims.

use crate::clock::Clock;
use crate::db::Repository;
use crate::domain::{Amount, PlayerId, PlayerRecord, ReferralRecord};
use crate::engine::referral::grand_referrer_bonus;
use crate::orchestration::{mutate_player, GameError};
use std::sync::Arc;
use tracing::info;

/// What a registration call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The edge was recorded and bonuses were credited.
    Registered,
    /// The referred player already had a ledger entry; nothing changed.
    AlreadyRegistered,
}

/// A player's referral standing.
#[derive(Debug, Clone)]
pub struct ReferralListing {
    pub referrals: Vec<ReferralRecord>,
    pub referrer: Option<PlayerId>,
}

/// Result of moving unclaimed bonus into the balance.
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub claimed: Amount,
    pub record: PlayerRecord,
}

/// Records referrer/referred relationships and pays the tiered bonuses.
pub struct ReferralLedger {
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
    bonus: Amount,
}

impl ReferralLedger {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>, bonus: Amount) -> Self {
        Self { repo, clock, bonus }
    }

    /// Register `referred` as invited by `referrer`.
    ///
    /// Idempotent: re-registration (any claimed referrer) is a no-op. On
    /// first registration the referrer is credited the direct bonus and
    /// their own referrer, if any, a quarter of it. Player rows are
    /// created on first contact.
    pub async fn register(
        &self,
        referred: &PlayerId,
        referrer: &PlayerId,
    ) -> Result<RegisterOutcome, GameError> {
        if referred == referrer {
            return Err(GameError::SelfReferral);
        }

        let now = self.clock.now_ms();
        self.repo
            .insert_player(&PlayerRecord::new(referred.clone(), now))
            .await?;
        self.repo
            .insert_player(&PlayerRecord::new(referrer.clone(), now))
            .await?;

        let inserted = self
            .repo
            .insert_referral(&ReferralRecord {
                referrer_id: referrer.clone(),
                referred_id: referred.clone(),
                scorpions_earned: self.bonus,
                created_time_ms: now,
            })
            .await?;

        if !inserted {
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        self.repo.set_referrer_if_absent(referred, referrer).await?;

        let bonus = self.bonus;
        let (referrer_record, _) = mutate_player(&self.repo, referrer, |record| {
            record.referral_bonus += bonus;
            Ok(())
        })
        .await?;

        info!(
            referred = %referred,
            referrer = %referrer,
            bonus = %bonus,
            "referral registered"
        );

        if let Some(grand) = referrer_record.referrer_id.clone() {
            let secondary = grand_referrer_bonus(bonus);
            mutate_player(&self.repo, &grand, |record| {
                record.referral_bonus += secondary;
                Ok(())
            })
            .await?;
            info!(grand_referrer = %grand, bonus = %secondary, "grand-referrer credited");
        }

        Ok(RegisterOutcome::Registered)
    }

    /// Everyone `user` referred, plus who referred `user`.
    pub async fn list(&self, user: &PlayerId) -> Result<ReferralListing, GameError> {
        let referrals = self.repo.list_referrals(user).await?;
        let referrer = self.repo.get_referrer(user).await?;
        Ok(ReferralListing {
            referrals,
            referrer,
        })
    }

    /// Move any unclaimed referral bonus into the spendable balance.
    ///
    /// Safe to call with nothing to claim: that is a no-op, not an error.
    pub async fn claim(&self, user: &PlayerId) -> Result<ClaimOutcome, GameError> {
        let (record, claimed) = mutate_player(&self.repo, user, |record| {
            let claimed = record.referral_bonus;
            if !claimed.is_zero() {
                record.balance += claimed;
                record.referral_bonus = Amount::zero();
            }
            Ok(claimed)
        })
        .await?;

        Ok(ClaimOutcome { claimed, record })
    }
}
