//! Player record operations: reads, first-contact inserts, CAS updates.

use super::{parse_amount, Repository};
use crate::domain::{GameDate, PlayerId, PlayerProfile, PlayerRecord, TimeMs};
use sqlx::Row;
use tracing::warn;

impl Repository {
    /// Insert a fresh player record; a no-op if the id already exists.
    ///
    /// Returns whether a row was inserted.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_player(&self, record: &PlayerRecord) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO players
                (id, balance, referral_bonus, mining_level, energy,
                 last_harvest_time, last_exhausted_time, cooldown_end_time,
                 last_login_date, login_streak, referrer_id,
                 username, first_name, last_name, language_code, photo_url,
                 is_premium, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.balance.to_canonical_string())
        .bind(record.referral_bonus.to_canonical_string())
        .bind(record.mining_level)
        .bind(record.energy)
        .bind(record.last_harvest_time.as_ms())
        .bind(record.last_exhausted_time.map(|t| t.as_ms()))
        .bind(record.cooldown_end_time.map(|t| t.as_ms()))
        .bind(record.last_login_date.map(|d| d.to_string()))
        .bind(record.login_streak)
        .bind(record.referrer_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(record.profile.username.as_deref())
        .bind(record.profile.first_name.as_deref())
        .bind(record.profile.last_name.as_deref())
        .bind(record.profile.language_code.as_deref())
        .bind(record.profile.photo_url.as_deref())
        .bind(record.profile.is_premium as i64)
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch a player record by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_player(&self, id: &PlayerId) -> Result<Option<PlayerRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, balance, referral_bonus, mining_level, energy,
                   last_harvest_time, last_exhausted_time, cooldown_end_time,
                   last_login_date, login_streak, referrer_id,
                   username, first_name, last_name, language_code, photo_url,
                   is_premium, version
            FROM players
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let balance: String = row.get("balance");
            let referral_bonus: String = row.get("referral_bonus");
            let last_login_date: Option<String> = row.get("last_login_date");
            let last_login_date = last_login_date.and_then(|s| {
                GameDate::parse(&s)
                    .map_err(|e| {
                        warn!(value = %s, error = %e, "Failed to parse stored login date, ignoring");
                    })
                    .ok()
            });

            PlayerRecord {
                id: PlayerId::new(row.get::<String, _>("id")),
                balance: parse_amount("balance", &balance),
                referral_bonus: parse_amount("referral_bonus", &referral_bonus),
                mining_level: row.get("mining_level"),
                energy: row.get("energy"),
                last_harvest_time: TimeMs::new(row.get("last_harvest_time")),
                last_exhausted_time: row
                    .get::<Option<i64>, _>("last_exhausted_time")
                    .map(TimeMs::new),
                cooldown_end_time: row
                    .get::<Option<i64>, _>("cooldown_end_time")
                    .map(TimeMs::new),
                last_login_date,
                login_streak: row.get("login_streak"),
                referrer_id: row.get::<Option<String>, _>("referrer_id").map(PlayerId::new),
                profile: PlayerProfile {
                    username: row.get("username"),
                    first_name: row.get("first_name"),
                    last_name: row.get("last_name"),
                    language_code: row.get("language_code"),
                    photo_url: row.get("photo_url"),
                    is_premium: row.get::<i64, _>("is_premium") != 0,
                },
                version: row.get("version"),
            }
        }))
    }

    /// Compare-and-swap update of a player's mutable state.
    ///
    /// The write only lands if the stored `version` still equals
    /// `record.version`; the stored version is then incremented. Returns
    /// false when another writer got there first.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn update_player_cas(&self, record: &PlayerRecord) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE players SET
                balance = ?,
                referral_bonus = ?,
                mining_level = ?,
                energy = ?,
                last_harvest_time = ?,
                last_exhausted_time = ?,
                cooldown_end_time = ?,
                last_login_date = ?,
                login_streak = ?,
                version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(record.balance.to_canonical_string())
        .bind(record.referral_bonus.to_canonical_string())
        .bind(record.mining_level)
        .bind(record.energy)
        .bind(record.last_harvest_time.as_ms())
        .bind(record.last_exhausted_time.map(|t| t.as_ms()))
        .bind(record.cooldown_end_time.map(|t| t.as_ms()))
        .bind(record.last_login_date.map(|d| d.to_string()))
        .bind(record.login_streak)
        .bind(record.id.as_str())
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Refresh the identity-provider profile fields, creating the row if
    /// this is the player's first contact.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_profile(
        &self,
        id: &PlayerId,
        profile: &PlayerProfile,
        now: TimeMs,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO players
                (id, last_harvest_time, username, first_name, last_name,
                 language_code, photo_url, is_premium)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                language_code = excluded.language_code,
                photo_url = excluded.photo_url,
                is_premium = excluded.is_premium,
                version = version + 1
            "#,
        )
        .bind(id.as_str())
        .bind(now.as_ms())
        .bind(profile.username.as_deref())
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.language_code.as_deref())
        .bind(profile.photo_url.as_deref())
        .bind(profile.is_premium as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// First-write-wins assignment of a player's referrer.
    ///
    /// Returns whether the referrer was set; false when one was already
    /// recorded (the guard lives in SQL, so two racing writers cannot both
    /// win).
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn set_referrer_if_absent(
        &self,
        id: &PlayerId,
        referrer: &PlayerId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET referrer_id = ?, version = version + 1
            WHERE id = ? AND referrer_id IS NULL
            "#,
        )
        .bind(referrer.as_str())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use crate::domain::Amount;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let (repo, _temp) = setup_test_db().await;

        let mut record = PlayerRecord::new(PlayerId::new("p1"), TimeMs::new(1000));
        record.balance = Amount::from(42);
        record.last_login_date = Some(GameDate::parse("2024-10-01").unwrap());
        record.login_streak = 3;
        record.profile.username = Some("scorpion_fan".to_string());
        record.profile.is_premium = true;

        assert!(repo.insert_player(&record).await.unwrap());
        let loaded = repo
            .get_player(&record.id)
            .await
            .unwrap()
            .expect("player should exist");
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let (repo, _temp) = setup_test_db().await;

        let record = PlayerRecord::new(PlayerId::new("p1"), TimeMs::new(1000));
        assert!(repo.insert_player(&record).await.unwrap());
        assert!(!repo.insert_player(&record).await.unwrap());
    }

    #[tokio::test]
    async fn test_cas_update_rejects_stale_version() {
        let (repo, _temp) = setup_test_db().await;

        let record = PlayerRecord::new(PlayerId::new("p1"), TimeMs::new(1000));
        repo.insert_player(&record).await.unwrap();

        let mut writer_a = repo.get_player(&record.id).await.unwrap().unwrap();
        let mut writer_b = writer_a.clone();

        writer_a.balance = Amount::from(10);
        assert!(repo.update_player_cas(&writer_a).await.unwrap());

        // Writer B still holds the old version; its write must not land.
        writer_b.balance = Amount::from(999);
        assert!(!repo.update_player_cas(&writer_b).await.unwrap());

        let loaded = repo.get_player(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.balance, Amount::from(10));
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_upsert_profile_creates_then_updates() {
        let (repo, _temp) = setup_test_db().await;
        let id = PlayerId::new("p1");

        let mut profile = PlayerProfile {
            username: Some("old".to_string()),
            ..Default::default()
        };
        repo.upsert_profile(&id, &profile, TimeMs::new(1000))
            .await
            .unwrap();

        let created = repo.get_player(&id).await.unwrap().unwrap();
        assert_eq!(created.profile.username.as_deref(), Some("old"));
        assert_eq!(created.energy, 100);

        profile.username = Some("new".to_string());
        repo.upsert_profile(&id, &profile, TimeMs::new(2000))
            .await
            .unwrap();

        let updated = repo.get_player(&id).await.unwrap().unwrap();
        assert_eq!(updated.profile.username.as_deref(), Some("new"));
        // Game state untouched by a profile refresh.
        assert_eq!(updated.last_harvest_time, TimeMs::new(1000));
    }

    #[tokio::test]
    async fn test_set_referrer_first_write_wins() {
        let (repo, _temp) = setup_test_db().await;
        let id = PlayerId::new("p1");
        repo.insert_player(&PlayerRecord::new(id.clone(), TimeMs::new(0)))
            .await
            .unwrap();

        assert!(repo
            .set_referrer_if_absent(&id, &PlayerId::new("u1"))
            .await
            .unwrap());
        assert!(!repo
            .set_referrer_if_absent(&id, &PlayerId::new("u2"))
            .await
            .unwrap());

        let loaded = repo.get_player(&id).await.unwrap().unwrap();
        assert_eq!(loaded.referrer_id, Some(PlayerId::new("u1")));
    }

    #[tokio::test]
    async fn test_get_missing_player_is_none() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo
            .get_player(&PlayerId::new("ghost"))
            .await
            .unwrap()
            .is_none());
    }
}
