use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexium_core::{DomainError, DomainResult, Entity, MaterialId, ObraId};

/// Compute the quantity after applying `delta`, never going below zero.
///
/// Withdrawing more than is on hand empties the stock instead of failing:
/// `clamped_quantity(5.0, -8.0) == 0.0`.
pub fn clamped_quantity(current: f64, delta: f64) -> f64 {
    (current + delta).max(0.0)
}

/// A stocked material, optionally scoped to one obra.
///
/// Field names follow the `materiais` collection columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obra_id: Option<ObraId>,
    pub created_at: DateTime<Utc>,
}

impl Material {
    /// Collection column holding the quantity (used by partial updates).
    pub const QUANTITY_FIELD: &'static str = "quantidade";
    pub const NAME_FIELD: &'static str = "nome";
    pub const OBRA_FIELD: &'static str = "obra_id";

    pub fn register(cmd: RegisterMaterial, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("material name cannot be empty"));
        }
        let unit = cmd.unit.trim();
        if unit.is_empty() {
            return Err(DomainError::validation("unit cannot be empty"));
        }
        if !cmd.initial_quantity.is_finite() || cmd.initial_quantity < 0.0 {
            return Err(DomainError::validation(
                "initial quantity must be a non-negative number",
            ));
        }

        Ok(Self {
            id: cmd.id.unwrap_or_default(),
            name: name.to_string(),
            unit: unit.to_string(),
            quantity: cmd.initial_quantity,
            obra_id: cmd.obra_id,
            created_at: now,
        })
    }

    /// Quantity this material would hold after `delta`.
    pub fn quantity_after(&self, delta: f64) -> f64 {
        clamped_quantity(self.quantity, delta)
    }
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> MaterialId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Command: register a new material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterMaterial {
    /// Explicit id (imports, tests); generated when absent.
    #[serde(default)]
    pub id: Option<MaterialId>,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub initial_quantity: f64,
    #[serde(default)]
    pub obra_id: Option<ObraId>,
}
