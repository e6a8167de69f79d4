//! Task groups: named sets of employees tasks can be assigned to.

use reqwest::Method;
use serde::Serialize;

use taskdeck_common::TaskGroup;

use crate::api::ApiClient;
use crate::errors::ApiError;

const GROUPS_PATH: &str = "/api/tasks/groups/";

/// Payload for creating or replacing a group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDraft {
    pub name: String,
    pub members: Vec<i64>,
}

fn group_path(id: i64) -> String {
    format!("{GROUPS_PATH}{id}/")
}

impl ApiClient {
    pub async fn list_groups(&self) -> Result<Vec<TaskGroup>, ApiError> {
        self.get_list(GROUPS_PATH, "group list").await
    }

    pub async fn get_group(&self, id: i64) -> Result<TaskGroup, ApiError> {
        self.get_json(&group_path(id), "group").await
    }

    pub async fn create_group(&self, draft: &GroupDraft) -> Result<TaskGroup, ApiError> {
        self.send_json(Method::POST, GROUPS_PATH, draft, "group create")
            .await
    }

    pub async fn update_group(&self, id: i64, draft: &GroupDraft) -> Result<TaskGroup, ApiError> {
        self.send_json(Method::PUT, &group_path(id), draft, "group update")
            .await
    }

    pub async fn delete_group(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&group_path(id)).await
    }
}
