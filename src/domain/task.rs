//! Task catalog: immutable templates plus per-player instances.
//!
//! The catalog is global; a player's progress lives in a lazily created
//! instance row so templates are never duplicated per user.

use crate::domain::{Amount, PlayerId};
use serde::{Deserialize, Serialize};

/// Immutable catalog entry describing a completable task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: i64,
    pub description: String,
    pub reward: Amount,
    /// Minimum spendable balance required to complete, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_balance: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Per-player completion status of a catalog task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    Pending,
    Approved,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::Pending => "pending",
            TaskStatus::Approved => "approved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(TaskStatus::NotStarted),
            "pending" => Some(TaskStatus::Pending),
            "approved" => Some(TaskStatus::Approved),
            _ => None,
        }
    }
}

/// A player's assignment of one catalog task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    pub player_id: PlayerId,
    pub template_id: i64,
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TaskStatus::NotStarted,
            TaskStatus::Pending,
            TaskStatus::Approved,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("completed"), None);
    }

    #[test]
    fn test_status_json_is_snake_case() {
        let json = serde_json::to_string(&TaskStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }
}
