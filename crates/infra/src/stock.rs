//! Inventory service: materials, stock movements and NFe imports.
//!
//! Applying a movement is one unit of work against the record store:
//!
//! ```text
//! begin
//!   ↓
//! get_for_update(material)        (locks the row until commit)
//!   ↓
//! update quantity = max(0, q + delta)
//!   ↓
//! insert movement
//!   ↓
//! insert notification             (only when the new level is low or zero)
//!   ↓
//! commit
//! ```
//!
//! Any failure before `commit` drops the transaction, so the material keeps
//! its previous quantity. The audit entry is appended after commit and is
//! best-effort.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use nexium_audit::{AuditAction, AuditEntityType, NewAuditEntry};
use nexium_core::{Actor, MaterialId, MovementId, NotificationId, ObraId};
use nexium_inventory::{
    Material, Movement, Notification, ProposedMovement, RegisterMaterial, evaluate_stock,
};
use nexium_nfe::Invoice;

use crate::SharedAuditLog;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{Repository, tx_get_for_update, tx_insert, tx_update};
use crate::store::{Query, RecordStore, RecordTx};

/// Outcome of one applied movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedMovement {
    pub movement: Movement,
    /// The material with its post-movement quantity.
    pub material: Material,
    pub notification: Option<Notification>,
}

/// Outcome of importing an NFe into stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub invoice_key: String,
    pub supplier: String,
    /// Materials that did not exist yet and were registered with zero stock.
    pub registered: Vec<Material>,
    pub applied: Vec<AppliedMovement>,
    /// Line items ignored because their quantity was not positive.
    pub skipped: usize,
}

#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn RecordStore>,
    materials: Repository<Material>,
    movements: Repository<Movement>,
    audit: SharedAuditLog,
}

impl StockService {
    pub fn new(store: Arc<dyn RecordStore>, audit: SharedAuditLog) -> Self {
        Self {
            materials: Repository::new(store.clone()),
            movements: Repository::new(store.clone()),
            store,
            audit,
        }
    }

    pub async fn register_material(
        &self,
        cmd: RegisterMaterial,
        actor: Actor,
    ) -> ServiceResult<Material> {
        let material = Material::register(cmd, Utc::now())?;
        let material = self.materials.insert(&material).await?;
        self.audit_registration(&material, actor);
        Ok(material)
    }

    pub async fn get_material(&self, id: MaterialId) -> ServiceResult<Material> {
        self.materials
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("material {id}")))
    }

    /// Materials ordered oldest first, optionally restricted to one obra.
    pub async fn list_materials(&self, obra_id: Option<ObraId>) -> ServiceResult<Vec<Material>> {
        let mut query = Query::new().oldest_first();
        if let Some(obra_id) = obra_id {
            query = query.eq(Material::OBRA_FIELD, json!(obra_id));
        }
        Ok(self.materials.list(&query).await?)
    }

    /// Apply `proposed` to its material and record it.
    ///
    /// The resulting quantity is never negative: a withdrawal larger than the
    /// stock on hand leaves the material at zero.
    pub async fn apply_movement(&self, proposed: ProposedMovement) -> ServiceResult<AppliedMovement> {
        let mut tx = self.store.begin().await?;
        let (applied, previous_quantity) = book_movement(tx.as_mut(), proposed, Utc::now()).await?;
        tx.commit().await?;

        self.record_movement(&applied, previous_quantity);
        Ok(applied)
    }

    /// Movement history of a material, newest first.
    pub async fn list_movements(&self, material_id: MaterialId) -> ServiceResult<Vec<Movement>> {
        let query = Query::new()
            .eq(Movement::MATERIAL_FIELD, json!(material_id))
            .newest_first();
        Ok(self.movements.list(&query).await?)
    }

    /// Book every line item of `invoice` as an incoming movement.
    ///
    /// Items are matched to materials by name within `obra_id`; unknown names
    /// are registered first with zero stock and the item's unit. Every item
    /// is resolved and validated before anything is written, and all writes
    /// share one transaction: either the whole invoice is booked or nothing is.
    pub async fn import_invoice(
        &self,
        invoice: &Invoice,
        obra_id: Option<ObraId>,
        actor: Actor,
    ) -> ServiceResult<ImportSummary> {
        let now = Utc::now();
        let reason = format!("NFe {}", invoice.key);
        let mut registered: Vec<Material> = Vec::new();
        let mut proposed = Vec::new();
        let mut skipped = 0;

        for item in &invoice.items {
            if !item.quantity.is_finite() || item.quantity <= 0.0 {
                skipped += 1;
                continue;
            }

            let name = item.description.trim();
            let known = registered.iter().find(|m| m.name == name).map(|m| m.id);
            let material_id = match known {
                Some(id) => id,
                None => match self.find_material(name, obra_id).await? {
                    Some(m) => m.id,
                    None => {
                        let m = Material::register(
                            RegisterMaterial {
                                id: None,
                                name: name.to_string(),
                                unit: item.unit.clone(),
                                initial_quantity: 0.0,
                                obra_id,
                            },
                            now,
                        )?;
                        let id = m.id;
                        registered.push(m);
                        id
                    }
                },
            };

            proposed.push(ProposedMovement::new(
                material_id,
                item.quantity,
                reason.clone(),
                actor.clone(),
            )?);
        }

        let mut tx = self.store.begin().await?;
        for material in &registered {
            tx_insert(tx.as_mut(), material).await?;
        }
        let mut booked = Vec::with_capacity(proposed.len());
        for movement in proposed {
            booked.push(book_movement(tx.as_mut(), movement, now).await?);
        }
        tx.commit().await?;

        for material in &registered {
            self.audit_registration(material, actor.clone());
        }
        let applied: Vec<AppliedMovement> = booked
            .into_iter()
            .map(|(applied, previous_quantity)| {
                self.record_movement(&applied, previous_quantity);
                applied
            })
            .collect();

        self.audit.append(NewAuditEntry::new(
            AuditAction::Import,
            AuditEntityType::Material,
            &invoice.key,
            format!(
                "NFe {} de {} importada: {} itens lançados, {} materiais novos",
                invoice.key,
                invoice.supplier.name,
                applied.len(),
                registered.len()
            ),
            actor,
        ));
        tracing::info!(
            key = %invoice.key,
            applied = applied.len(),
            registered = registered.len(),
            skipped,
            "nfe imported into stock"
        );

        Ok(ImportSummary {
            invoice_key: invoice.key.clone(),
            supplier: invoice.supplier.name.clone(),
            registered,
            applied,
            skipped,
        })
    }

    async fn find_material(
        &self,
        name: &str,
        obra_id: Option<ObraId>,
    ) -> ServiceResult<Option<Material>> {
        let query = Query::new()
            .eq(Material::NAME_FIELD, name.trim())
            .eq(Material::OBRA_FIELD, json!(obra_id))
            .oldest_first()
            .limit(1);
        Ok(self.materials.list(&query).await?.into_iter().next())
    }

    fn audit_registration(&self, material: &Material, actor: Actor) {
        self.audit.append(NewAuditEntry::new(
            AuditAction::Create,
            AuditEntityType::Material,
            material.id,
            format!(
                "Material {} cadastrado com {} {}",
                material.name, material.quantity, material.unit
            ),
            actor,
        ));
    }

    /// Log and audit a committed movement.
    fn record_movement(&self, applied: &AppliedMovement, previous_quantity: f64) {
        let movement = &applied.movement;
        let material = &applied.material;
        tracing::info!(
            material_id = %material.id,
            delta = movement.delta,
            previous_quantity,
            new_quantity = material.quantity,
            actor = %movement.actor,
            "stock movement applied"
        );
        if let Some(n) = &applied.notification {
            tracing::info!(
                material_id = %material.id,
                priority = ?n.priority,
                "stock alert emitted"
            );
        }

        self.audit.append(NewAuditEntry::new(
            AuditAction::StockMovement,
            AuditEntityType::Material,
            material.id,
            movement_details(material, movement),
            movement.actor.clone(),
        ));
    }
}

/// Lock the material, write its new quantity, the movement and any stock
/// alert. Returns the outcome and the quantity before the movement.
async fn book_movement(
    tx: &mut dyn RecordTx,
    proposed: ProposedMovement,
    now: DateTime<Utc>,
) -> ServiceResult<(AppliedMovement, f64)> {
    let material_id = proposed.material_id;

    let current: Material = tx_get_for_update(&mut *tx, material_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("material {material_id}")))?;
    let previous_quantity = current.quantity;
    let new_quantity = current.quantity_after(proposed.delta);

    let material: Material = tx_update(
        &mut *tx,
        material_id,
        json!({ Material::QUANTITY_FIELD: new_quantity }),
    )
    .await?;

    let movement = proposed.into_movement(MovementId::new(), now);
    let movement = tx_insert(&mut *tx, &movement).await?;

    let notification = match evaluate_stock(&material) {
        Some(alert) => {
            let notification = alert.into_notification(NotificationId::new(), now);
            Some(tx_insert(&mut *tx, &notification).await?)
        }
        None => None,
    };

    Ok((
        AppliedMovement {
            movement,
            material,
            notification,
        },
        previous_quantity,
    ))
}

fn movement_details(material: &Material, movement: &Movement) -> String {
    let verb = if movement.delta < 0.0 { "Saída" } else { "Entrada" };
    let mut details = format!(
        "{verb} de {} {} em {} (saldo: {})",
        movement.delta.abs(),
        material.unit,
        material.name,
        material.quantity
    );
    if !movement.reason.is_empty() {
        details.push_str(": ");
        details.push_str(&movement.reason);
    }
    details
}
