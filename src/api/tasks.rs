//! Task CRUD.
//!
//! `GET /api/tasks/my-tasks/` is scoped server-side: admins and managers
//! see every task, employees only their assignments. The client exposes a
//! single `list_tasks` and lets the backend decide.

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use taskdeck_common::{Task, TaskStatus};

use crate::api::ApiClient;
use crate::errors::ApiError;

const MY_TASKS_PATH: &str = "/api/tasks/my-tasks/";
const CREATE_TASK_PATH: &str = "/api/tasks/create/";

/// Payload for creating a task. The backend requires at least one
/// assignee or a group, and folds group members into the assignment set.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assigned_to: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
}

/// Partial update to a task; omitted fields are left unchanged.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
}

/// Create answers `{"message": ..., "task": {...}}` rather than the bare
/// record.
#[derive(Deserialize)]
struct CreatedTask {
    task: Task,
}

fn task_path(id: i64) -> String {
    format!("/api/tasks/{id}/")
}

impl ApiClient {
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_list(MY_TASKS_PATH, "task list").await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let body: CreatedTask = self
            .send_json(Method::POST, CREATE_TASK_PATH, draft, "task create")
            .await?;
        Ok(body.task)
    }

    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.send_json(Method::PATCH, &task_path(id), patch, "task update")
            .await
    }

    /// Status-only update — the one mutation employees are allowed.
    pub async fn set_task_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        self.update_task(
            id,
            &TaskPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&task_path(id)).await
    }
}
