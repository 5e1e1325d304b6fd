//! Task catalog and per-player instance operations.

use super::{parse_amount, Repository};
use crate::domain::{Amount, PlayerId, TaskInstance, TaskStatus, TaskTemplate};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

fn template_from_row(row: &sqlx::sqlite::SqliteRow) -> TaskTemplate {
    let reward: String = row.get("reward");
    let required_balance: Option<String> = row.get("required_balance");

    TaskTemplate {
        id: row.get("id"),
        description: row.get("description"),
        reward: parse_amount("reward", &reward),
        required_balance: required_balance.and_then(|s| {
            Amount::from_str(&s)
                .map_err(|e| {
                    warn!(value = %s, error = %e, "Failed to parse required_balance, ignoring gate");
                })
                .ok()
        }),
        platform: row.get("platform"),
        link: row.get("link"),
    }
}

impl Repository {
    /// The immutable task catalog, in id order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_task_templates(&self) -> Result<Vec<TaskTemplate>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, reward, required_balance, platform, link
            FROM task_templates
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(template_from_row).collect())
    }

    /// Fetch one catalog entry.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_task_template(
        &self,
        template_id: i64,
    ) -> Result<Option<TaskTemplate>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, description, reward, required_balance, platform, link
            FROM task_templates
            WHERE id = ?
            "#,
        )
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(template_from_row))
    }

    /// Lazily assign any catalog tasks this player does not have yet.
    ///
    /// Idempotent; existing instances (and their status) are untouched.
    /// Returns the number of newly created instances.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn assign_missing_task_instances(
        &self,
        player: &PlayerId,
        template_ids: &[i64],
    ) -> Result<usize, sqlx::Error> {
        if template_ids.is_empty() {
            return Ok(0);
        }

        let mut total_inserted = 0usize;
        let mut tx = self.pool.begin().await?;

        for template_id in template_ids {
            let result = sqlx::query(
                r#"
                INSERT INTO task_instances (player_id, template_id, status)
                VALUES (?, ?, 'not_started')
                ON CONFLICT(player_id, template_id) DO NOTHING
                "#,
            )
            .bind(player.as_str())
            .bind(*template_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                total_inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(total_inserted)
    }

    /// A player's task instances, in template id order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_task_instances(
        &self,
        player: &PlayerId,
    ) -> Result<Vec<TaskInstance>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, template_id, status
            FROM task_instances
            WHERE player_id = ?
            ORDER BY template_id ASC
            "#,
        )
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await?;

        let instances = rows
            .iter()
            .map(|row| {
                let status: String = row.get("status");
                TaskInstance {
                    player_id: PlayerId::new(row.get::<String, _>("player_id")),
                    template_id: row.get("template_id"),
                    status: TaskStatus::parse(&status).unwrap_or_else(|| {
                        warn!(value = %status, "Unknown task status in store, treating as not_started");
                        TaskStatus::NotStarted
                    }),
                }
            })
            .collect();

        Ok(instances)
    }

    /// Mark a not-started task as pending. Returns whether the transition
    /// happened.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn mark_task_pending(
        &self,
        player: &PlayerId,
        template_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE task_instances
            SET status = 'pending'
            WHERE player_id = ? AND template_id = ? AND status = 'not_started'
            "#,
        )
        .bind(player.as_str())
        .bind(template_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition a task into approved.
    ///
    /// The status guard in SQL makes the reward-bearing transition happen
    /// at most once per (player, template), even under racing calls.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn approve_task(
        &self,
        player: &PlayerId,
        template_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE task_instances
            SET status = 'approved'
            WHERE player_id = ? AND template_id = ? AND status IN ('not_started', 'pending')
            "#,
        )
        .bind(player.as_str())
        .bind(template_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
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
    async fn test_catalog_is_seeded() {
        let (repo, _temp) = setup_test_db().await;
        let templates = repo.list_task_templates().await.unwrap();
        assert_eq!(templates.len(), 5);
        assert_eq!(templates[0].id, 1);

        let gated = templates.iter().find(|t| t.id == 5).unwrap();
        assert_eq!(gated.required_balance, Some(Amount::from(500)));
    }

    #[tokio::test]
    async fn test_assign_missing_is_idempotent() {
        let (repo, _temp) = setup_test_db().await;
        let player = PlayerId::new("p1");
        let ids: Vec<i64> = repo
            .list_task_templates()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(
            repo.assign_missing_task_instances(&player, &ids).await.unwrap(),
            5
        );
        assert_eq!(
            repo.assign_missing_task_instances(&player, &ids).await.unwrap(),
            0
        );

        let instances = repo.list_task_instances(&player).await.unwrap();
        assert_eq!(instances.len(), 5);
        assert!(instances
            .iter()
            .all(|i| i.status == TaskStatus::NotStarted));
    }

    #[tokio::test]
    async fn test_assign_does_not_reset_status() {
        let (repo, _temp) = setup_test_db().await;
        let player = PlayerId::new("p1");
        repo.assign_missing_task_instances(&player, &[1, 2]).await.unwrap();
        repo.approve_task(&player, 1).await.unwrap();

        repo.assign_missing_task_instances(&player, &[1, 2]).await.unwrap();

        let instances = repo.list_task_instances(&player).await.unwrap();
        assert_eq!(instances[0].status, TaskStatus::Approved);
    }

    #[tokio::test]
    async fn test_approve_happens_at_most_once() {
        let (repo, _temp) = setup_test_db().await;
        let player = PlayerId::new("p1");
        repo.assign_missing_task_instances(&player, &[1]).await.unwrap();

        assert!(repo.approve_task(&player, 1).await.unwrap());
        assert!(!repo.approve_task(&player, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_pending_transition_only_from_not_started() {
        let (repo, _temp) = setup_test_db().await;
        let player = PlayerId::new("p1");
        repo.assign_missing_task_instances(&player, &[3]).await.unwrap();

        assert!(repo.mark_task_pending(&player, 3).await.unwrap());
        assert!(!repo.mark_task_pending(&player, 3).await.unwrap());

        // Pending tasks can still be approved.
        assert!(repo.approve_task(&player, 3).await.unwrap());
        assert!(!repo.mark_task_pending(&player, 3).await.unwrap());
    }
}
