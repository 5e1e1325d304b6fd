use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Amount, PlayerId, TaskStatus};
use crate::error::AppError;
use crate::orchestration::TaskView;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksResponse {
    pub tasks: Vec<TaskDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: i64,
    pub description: String,
    pub reward: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_balance: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub status: TaskStatus,
}

impl From<TaskView> for TaskDto {
    fn from(view: TaskView) -> Self {
        TaskDto {
            id: view.template.id,
            description: view.template.description,
            reward: view.template.reward,
            required_balance: view.template.required_balance,
            platform: view.template.platform,
            link: view.template.link,
            status: view.status,
        }
    }
}

pub async fn get_tasks(
    Query(params): Query<TasksQuery>,
    State(state): State<AppState>,
) -> Result<Json<TasksResponse>, AppError> {
    let player = PlayerId::new(params.user_id);
    let views = state.tasks.ensure_assigned(&player).await?;

    Ok(Json(TasksResponse {
        tasks: views.into_iter().map(TaskDto::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActionBody {
    pub user_id: Option<String>,
    pub task_id: Option<i64>,
}

fn body_params(body: TaskActionBody) -> Result<(PlayerId, i64), AppError> {
    match (body.user_id.filter(|s| !s.is_empty()), body.task_id) {
        (Some(user), Some(task)) => Ok((PlayerId::new(user), task)),
        _ => Err(AppError::BadRequest("Missing userId or taskId".into())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTaskResponse {
    pub status: TaskStatus,
}

pub async fn start_task(
    State(state): State<AppState>,
    Json(body): Json<TaskActionBody>,
) -> Result<Json<StartTaskResponse>, AppError> {
    let (player, task_id) = body_params(body)?;
    let status = state.tasks.start(&player, task_id).await?;
    Ok(Json(StartTaskResponse { status }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskResponse {
    /// False when the task had already been approved.
    pub credited: bool,
    pub status: TaskStatus,
    pub balance: Amount,
}

pub async fn complete_task(
    State(state): State<AppState>,
    Json(body): Json<TaskActionBody>,
) -> Result<Json<CompleteTaskResponse>, AppError> {
    let (player, task_id) = body_params(body)?;
    let outcome = state.tasks.complete(&player, task_id).await?;

    Ok(Json(CompleteTaskResponse {
        credited: outcome.credited,
        status: outcome.status,
        balance: outcome.record.balance,
    }))
}
