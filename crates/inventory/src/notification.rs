use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexium_core::{Entity, NotificationId, ObraId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Estoque,
    Obra,
    Tarefa,
    Sistema,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Estoque => "estoque",
            NotificationCategory::Obra => "obra",
            NotificationCategory::Tarefa => "tarefa",
            NotificationCategory::Sistema => "sistema",
        }
    }
}

/// A notification that has been decided on but not stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub title: String,
    pub description: String,
    pub category: NotificationCategory,
    pub priority: Priority,
    pub obra_id: Option<ObraId>,
}

impl NewNotification {
    pub fn into_notification(self, id: NotificationId, now: DateTime<Utc>) -> Notification {
        Notification {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            obra_id: self.obra_id,
            read: false,
            archived: false,
            created_at: now,
        }
    }
}

/// Stored notification (`notificacoes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "tipo")]
    pub category: NotificationCategory,
    #[serde(rename = "prioridade")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obra_id: Option<ObraId>,
    #[serde(rename = "lida", default)]
    pub read: bool,
    #[serde(rename = "arquivada", default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub const READ_FIELD: &'static str = "lida";
    pub const ARCHIVED_FIELD: &'static str = "arquivada";
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> NotificationId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
