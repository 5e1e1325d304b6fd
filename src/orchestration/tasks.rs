//! Task board: lazy assignment, start and reward-bearing completion.

use crate::db::Repository;
use crate::domain::{PlayerId, PlayerRecord, TaskStatus, TaskTemplate};
use crate::orchestration::{mutate_player, GameError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A catalog task joined with the player's status for it.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub template: TaskTemplate,
    pub status: TaskStatus,
}

/// Result of a completion attempt.
#[derive(Debug, Clone)]
pub struct CompleteOutcome {
    /// False when the task was already approved (no double reward).
    pub credited: bool,
    pub status: TaskStatus,
    pub record: PlayerRecord,
}

/// Serves the task catalog and applies per-player transitions.
pub struct TaskBoard {
    repo: Arc<Repository>,
}

impl TaskBoard {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Lazily assign any unassigned catalog tasks, then return the
    /// player's full board. Idempotent.
    pub async fn ensure_assigned(&self, player: &PlayerId) -> Result<Vec<TaskView>, GameError> {
        if self.repo.get_player(player).await?.is_none() {
            return Err(GameError::UnknownPlayer(player.clone()));
        }

        let templates = self.repo.list_task_templates().await?;
        let ids: Vec<i64> = templates.iter().map(|t| t.id).collect();
        self.repo.assign_missing_task_instances(player, &ids).await?;

        let statuses: HashMap<i64, TaskStatus> = self
            .repo
            .list_task_instances(player)
            .await?
            .into_iter()
            .map(|i| (i.template_id, i.status))
            .collect();

        Ok(templates
            .into_iter()
            .map(|template| {
                let status = statuses
                    .get(&template.id)
                    .copied()
                    .unwrap_or(TaskStatus::NotStarted);
                TaskView { template, status }
            })
            .collect())
    }

    /// Mark a task as started (pending verification). No reward; no-op for
    /// anything past not-started.
    pub async fn start(&self, player: &PlayerId, template_id: i64) -> Result<TaskStatus, GameError> {
        self.ensure_instance(player, template_id).await?;
        self.repo.mark_task_pending(player, template_id).await?;

        let status = self.instance_status(player, template_id).await?;
        Ok(status)
    }

    /// Complete a task and credit its reward exactly once.
    ///
    /// A balance-gated task whose requirement is not met is rejected with a
    /// user-facing message and leaves all state unchanged; completing an
    /// already approved task is a no-op.
    pub async fn complete(
        &self,
        player: &PlayerId,
        template_id: i64,
    ) -> Result<CompleteOutcome, GameError> {
        let template = self
            .repo
            .get_task_template(template_id)
            .await?
            .ok_or(GameError::UnknownTask(template_id))?;

        let record = self
            .repo
            .get_player(player)
            .await?
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))?;

        if let Some(required) = template.required_balance {
            if record.balance < required {
                return Err(GameError::RequirementNotMet(format!(
                    "task requires a balance of {}, current balance is {}",
                    required, record.balance
                )));
            }
        }

        self.ensure_instance(player, template_id).await?;

        // The SQL status guard makes this transition first-caller-wins.
        let credited = self.repo.approve_task(player, template_id).await?;

        let record = if credited {
            let reward = template.reward;
            let (record, _) = mutate_player(&self.repo, player, |record| {
                record.balance += reward;
                Ok(())
            })
            .await?;
            info!(player = %player, task = template_id, reward = %reward, "task reward credited");
            record
        } else {
            record
        };

        Ok(CompleteOutcome {
            credited,
            status: TaskStatus::Approved,
            record,
        })
    }

    async fn ensure_instance(&self, player: &PlayerId, template_id: i64) -> Result<(), GameError> {
        if self.repo.get_task_template(template_id).await?.is_none() {
            return Err(GameError::UnknownTask(template_id));
        }
        if self.repo.get_player(player).await?.is_none() {
            return Err(GameError::UnknownPlayer(player.clone()));
        }
        self.repo
            .assign_missing_task_instances(player, &[template_id])
            .await?;
        Ok(())
    }

    async fn instance_status(
        &self,
        player: &PlayerId,
        template_id: i64,
    ) -> Result<TaskStatus, GameError> {
        let status = self
            .repo
            .list_task_instances(player)
            .await?
            .into_iter()
            .find(|i| i.template_id == template_id)
            .map(|i| i.status)
            .unwrap_or(TaskStatus::NotStarted);
        Ok(status)
    }
}
