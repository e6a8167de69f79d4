//! Employee and manager records.
//!
//! The backend exposes one collection for both; the manager/employee split
//! is a client-side filter on `role`, the same split the admin screens
//! made.

use reqwest::Method;
use serde::Serialize;

use taskdeck_common::{Role, User};

use crate::api::ApiClient;
use crate::errors::ApiError;

const EMPLOYEES_PATH: &str = "/api/users/employees/";

/// Partial update to a user record; omitted fields are left unchanged.
#[derive(Debug, Default, Clone, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn user_path(id: i64) -> String {
    format!("{EMPLOYEES_PATH}{id}/")
}

impl ApiClient {
    /// Fetch the whole user collection, managers included.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list(EMPLOYEES_PATH, "user list").await
    }

    /// Users whose effective role is employee.
    pub async fn list_employees(&self) -> Result<Vec<User>, ApiError> {
        Ok(filter_role(self.list_users().await?, Role::Employee))
    }

    /// Users whose effective role is manager.
    pub async fn list_managers(&self) -> Result<Vec<User>, ApiError> {
        Ok(filter_role(self.list_users().await?, Role::Manager))
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        self.get_json(&user_path(id), "user").await
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        self.send_json(Method::PUT, &user_path(id), update, "user update")
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&user_path(id)).await
    }
}

fn filter_role(users: Vec<User>, role: Role) -> Vec<User> {
    users
        .into_iter()
        .filter(|user| user.effective_role() == role)
        .collect()
}
