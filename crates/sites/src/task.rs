use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexium_core::{DomainError, DomainResult, Entity, ObraId, TaskId};

/// Kanban column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// A task on an obra's board (`tarefas`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub obra_id: ObraId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(rename = "prioridade", default)]
    pub priority: TaskPriority,
    #[serde(rename = "responsavel", default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl Task {
    pub const OBRA_FIELD: &'static str = "obra_id";

    pub fn create(obra_id: ObraId, cmd: CreateTask, now: DateTime<Utc>) -> DomainResult<Self> {
        let title = cmd.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("task title cannot be empty"));
        }
        Ok(Self {
            id: TaskId::new(),
            obra_id,
            title: title.to_string(),
            description: cmd.description.trim().to_string(),
            status: TaskStatus::Todo,
            priority: cmd.priority,
            assignee: cmd
                .assignee
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            created_at: now,
        })
    }

    /// Move the task to another column. Returns the previous column, or
    /// `None` if the task was already there.
    pub fn move_to(&mut self, status: TaskStatus) -> Option<TaskStatus> {
        if self.status == status {
            return None;
        }
        Some(std::mem::replace(&mut self.status, status))
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
