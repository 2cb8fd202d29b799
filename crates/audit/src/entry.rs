use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexium_core::{Actor, AuditEntryId};

/// Kind of action being recorded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StockMovement,
    StatusChange,
    Import,
    Export,
    Login,
    Logout,
}

/// Type of the entity an entry describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEntityType {
    Obra,
    Tarefa,
    Material,
    Movimentacao,
    Notificacao,
    Relatorio,
    Usuario,
}

/// One line of the audit log.
///
/// Timestamps serialize as ISO-8601 strings (chrono's serde format) and parse
/// back into `DateTime<Utc>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub action: AuditAction,
    pub details: String,
    pub entity_type: AuditEntityType,
    pub entity_id: String,
}

/// What a caller hands to the recorder; id and timestamp are assigned on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub details: String,
    pub actor: Actor,
    pub entity_type: AuditEntityType,
    pub entity_id: String,
}

impl NewAuditEntry {
    pub fn new(
        action: AuditAction,
        entity_type: AuditEntityType,
        entity_id: impl ToString,
        details: impl Into<String>,
        actor: Actor,
    ) -> Self {
        Self {
            action,
            details: details.into(),
            actor,
            entity_type,
            entity_id: entity_id.to_string(),
        }
    }

    pub(crate) fn stamp(self, now: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            id: AuditEntryId::new(),
            timestamp: now,
            actor: self.actor,
            action: self.action,
            details: self.details,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
        }
    }
}
