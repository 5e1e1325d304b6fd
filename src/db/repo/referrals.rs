//! Referral ledger operations.

use super::{parse_amount, Repository};
use crate::domain::{PlayerId, ReferralRecord, TimeMs};
use sqlx::Row;

impl Repository {
    /// Insert a referral edge idempotently.
    ///
    /// The ledger holds at most one row per referred player; a duplicate
    /// registration is a no-op. Returns whether a row was inserted.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_referral(&self, record: &ReferralRecord) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO referrals (referrer_id, referred_id, scorpions_earned, created_time_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(referred_id) DO NOTHING
            "#,
        )
        .bind(record.referrer_id.as_str())
        .bind(record.referred_id.as_str())
        .bind(record.scorpions_earned.to_canonical_string())
        .bind(record.created_time_ms.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All players referred by `referrer`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_referrals(
        &self,
        referrer: &PlayerId,
    ) -> Result<Vec<ReferralRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT referrer_id, referred_id, scorpions_earned, created_time_ms
            FROM referrals
            WHERE referrer_id = ?
            ORDER BY created_time_ms ASC, id ASC
            "#,
        )
        .bind(referrer.as_str())
        .fetch_all(&self.pool)
        .await?;

        let referrals = rows
            .iter()
            .map(|row| {
                let earned: String = row.get("scorpions_earned");
                ReferralRecord {
                    referrer_id: PlayerId::new(row.get::<String, _>("referrer_id")),
                    referred_id: PlayerId::new(row.get::<String, _>("referred_id")),
                    scorpions_earned: parse_amount("scorpions_earned", &earned),
                    created_time_ms: TimeMs::new(row.get("created_time_ms")),
                }
            })
            .collect();

        Ok(referrals)
    }

    /// The referrer of `referred`, if any; a player has at most one.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_referrer(
        &self,
        referred: &PlayerId,
    ) -> Result<Option<PlayerId>, sqlx::Error> {
        let row = sqlx::query("SELECT referrer_id FROM referrals WHERE referred_id = ?")
            .bind(referred.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| PlayerId::new(r.get::<String, _>("referrer_id"))))
    }
}
