//! Per-resource data services.
//!
//! These are the client-side counterparts of the backend collections:
//! each service owns CRUD for one resource and a locally held snapshot of
//! the collection. After any successful mutation the service refetches the
//! collection before returning, so the snapshot always reflects the change
//! by the time the caller reads it.
//!
//! Snapshots sit behind a `std::sync::RwLock`; the lock is never held
//! across an await.

use std::sync::{Arc, RwLock};

use taskdeck_common::{Task, TaskGroup, TaskStatus, User};

use crate::api::ApiClient;
use crate::api::employees::UserUpdate;
use crate::api::groups::GroupDraft;
use crate::api::tasks::{TaskDraft, TaskPatch};
use crate::errors::ApiError;

/// Tasks visible to the current session.
pub struct TaskService {
    client: Arc<ApiClient>,
    snapshot: RwLock<Vec<Task>>,
}

impl TaskService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Last fetched collection state.
    pub fn snapshot(&self) -> Vec<Task> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    /// Fetch the collection and replace the snapshot.
    pub async fn refresh(&self) -> Result<Vec<Task>, ApiError> {
        let tasks = self.client.list_tasks().await?;
        *self.snapshot.write().expect("snapshot lock poisoned") = tasks.clone();
        Ok(tasks)
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let task = self.client.create_task(draft).await?;
        self.refresh().await?;
        Ok(task)
    }

    pub async fn update(&self, id: i64, patch: &TaskPatch) -> Result<Task, ApiError> {
        let task = self.client.update_task(id, patch).await?;
        self.refresh().await?;
        Ok(task)
    }

    pub async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Task, ApiError> {
        let task = self.client.set_task_status(id, status).await?;
        self.refresh().await?;
        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete_task(id).await?;
        self.refresh().await?;
        Ok(())
    }
}

/// Task groups.
pub struct GroupService {
    client: Arc<ApiClient>,
    snapshot: RwLock<Vec<TaskGroup>>,
}

impl GroupService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Vec<TaskGroup> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    pub async fn refresh(&self) -> Result<Vec<TaskGroup>, ApiError> {
        let groups = self.client.list_groups().await?;
        *self.snapshot.write().expect("snapshot lock poisoned") = groups.clone();
        Ok(groups)
    }

    pub async fn create(&self, draft: &GroupDraft) -> Result<TaskGroup, ApiError> {
        let group = self.client.create_group(draft).await?;
        self.refresh().await?;
        Ok(group)
    }

    pub async fn update(&self, id: i64, draft: &GroupDraft) -> Result<TaskGroup, ApiError> {
        let group = self.client.update_group(id, draft).await?;
        self.refresh().await?;
        Ok(group)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete_group(id).await?;
        self.refresh().await?;
        Ok(())
    }
}

/// Employee and manager records (one backend collection, role-filtered).
pub struct UserService {
    client: Arc<ApiClient>,
    snapshot: RwLock<Vec<User>>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Vec<User> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    pub async fn refresh(&self) -> Result<Vec<User>, ApiError> {
        let users = self.client.list_users().await?;
        *self.snapshot.write().expect("snapshot lock poisoned") = users.clone();
        Ok(users)
    }

    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        let user = self.client.update_user(id, update).await?;
        self.refresh().await?;
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete_user(id).await?;
        self.refresh().await?;
        Ok(())
    }
}
