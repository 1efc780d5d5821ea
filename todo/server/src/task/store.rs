use crate::entities::*;
use async_trait::async_trait;
use sea_orm::*;

use super::{Actor, Task, TaskId, TaskStore, TaskStoreError};

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(TaskId::new(model.id), Actor::new(model.owner), model.title)
    }
}

/// [`TaskStore`] backed by a sea-orm database connection.
#[derive(Clone, Debug)]
pub struct SeaOrmTaskStore {
    db: DatabaseConnection,
}

impl SeaOrmTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for SeaOrmTaskStore {
    #[tracing::instrument(skip(self))]
    async fn create(&self, owner: &Actor, title: &str) -> Result<TaskId, TaskStoreError> {
        let active_model = task::ActiveModel {
            owner: ActiveValue::Set(owner.as_str().to_string()),
            title: ActiveValue::Set(title.to_string()),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        Ok(TaskId::new(created_model.id))
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, id: TaskId) -> Result<Option<Task>, TaskStoreError> {
        let model = task::Entity::find_by_id(id.value()).one(&self.db).await?;
        Ok(model.map(Task::from))
    }

    #[tracing::instrument(skip(self))]
    async fn load_all_by_owner(&self, owner: &Actor) -> Result<Vec<Task>, TaskStoreError> {
        let tasks = task::Entity::find()
            .filter(task::Column::Owner.eq(owner.as_str()))
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: TaskId) -> Result<(), TaskStoreError> {
        let result = task::Entity::delete_by_id(id.value()).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        Ok(())
    }
}
