//! Task repository backed by the TaskFlow REST API

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::task::{NewTask, Task, TaskDraft, TaskId, TaskPatch, TaskRepository};
use crate::{Error, Result};

pub struct HttpTaskRepository {
    client: Arc<ApiClient>,
}

impl HttpTaskRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskRepository for HttpTaskRepository {
    async fn list_where(&self, owner_id: &str) -> Result<Vec<Task>> {
        let request = self
            .client
            .request(Method::GET, "/api/tasks")
            .query(&[("ownerId", owner_id)]);
        let response = self.client.send(request).await?;
        self.client.json(response).await
    }

    async fn get(&self, id: &str) -> Result<Option<Task>> {
        let request = self
            .client
            .request(Method::GET, &format!("/api/tasks/{}", id));
        match self.client.send(request).await {
            Ok(response) => Ok(Some(self.client.json(response).await?)),
            Err(Error::TaskNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert(&self, record: NewTask) -> Result<TaskId> {
        let owner_id = record.owner_id.clone();
        let body = TaskDraft {
            title: record.title,
            category: record.category,
            priority: record.priority,
            date: record.date,
        };
        let request = self.client.request(Method::POST, "/api/tasks").json(&body);
        let response = self.client.send(request).await?;
        let created: Task = self.client.json(response).await?;

        if created.owner_id != owner_id {
            return Err(Error::Unauthenticated);
        }
        Ok(created.id)
    }

    async fn update_fields(&self, id: &str, patch: TaskPatch) -> Result<()> {
        let request = self
            .client
            .request(Method::PATCH, &format!("/api/tasks/{}", id))
            .json(&patch);
        self.client.send(request).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/api/tasks/{}", id));
        match self.client.send(request).await {
            Ok(_) => Ok(true),
            Err(Error::TaskNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
