use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexium_core::{Actor, DomainError, DomainResult, Entity, MaterialId, MovementId};

/// Direction of a movement, derived from the sign of its delta.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entrada,
    Saida,
}

/// A requested change to a material's stock, not yet applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedMovement {
    pub material_id: MaterialId,
    pub delta: f64,
    pub reason: String,
    pub actor: Actor,
}

impl ProposedMovement {
    /// A zero delta is accepted; only non-finite values are rejected.
    pub fn new(
        material_id: MaterialId,
        delta: f64,
        reason: impl Into<String>,
        actor: Actor,
    ) -> DomainResult<Self> {
        if !delta.is_finite() {
            return Err(DomainError::validation("movement quantity must be a finite number"));
        }
        Ok(Self {
            material_id,
            delta,
            reason: reason.into().trim().to_string(),
            actor,
        })
    }

    pub fn into_movement(self, id: MovementId, now: DateTime<Utc>) -> Movement {
        Movement {
            id,
            material_id: self.material_id,
            delta: self.delta,
            kind: MovementKind::of(self.delta),
            reason: self.reason,
            actor: self.actor,
            created_at: now,
        }
    }
}

impl MovementKind {
    pub fn of(delta: f64) -> Self {
        if delta < 0.0 {
            MovementKind::Saida
        } else {
            MovementKind::Entrada
        }
    }
}

/// Immutable stock movement as stored in `movimentacoes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub material_id: MaterialId,
    /// Signed delta as requested (before clamping of the material quantity).
    #[serde(rename = "quantidade")]
    pub delta: f64,
    #[serde(rename = "tipo")]
    pub kind: MovementKind,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "usuario")]
    pub actor: Actor,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    pub const MATERIAL_FIELD: &'static str = "material_id";
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> MovementId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
