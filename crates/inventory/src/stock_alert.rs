//! Low-stock policy.
//!
//! Decides, after every movement, whether the new quantity warrants a
//! notification. The bands are fixed:
//!
//! | quantity      | outcome                           |
//! |---------------|-----------------------------------|
//! | `0`           | `critical` "Estoque esgotado"     |
//! | `(0, 10)`     | `high` "Estoque baixo"            |
//! | `>= 10`       | nothing                           |

use crate::material::Material;
use crate::notification::{NewNotification, NotificationCategory, Priority};

/// Quantities strictly below this (and above zero) are "low".
pub const LOW_STOCK_THRESHOLD: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockLevel {
    Depleted,
    Low,
    Adequate,
}

impl StockLevel {
    pub fn of(quantity: f64) -> Self {
        if quantity <= 0.0 {
            StockLevel::Depleted
        } else if quantity < LOW_STOCK_THRESHOLD {
            StockLevel::Low
        } else {
            StockLevel::Adequate
        }
    }
}

/// Decide the notification (if any) for `material` after a movement.
///
/// `material` must already carry the post-movement quantity. Quantities are
/// clamped at zero before they reach this point, so `<= 0` only ever means
/// exactly zero.
pub fn evaluate_stock(material: &Material) -> Option<NewNotification> {
    let (title, description, priority) = match StockLevel::of(material.quantity) {
        StockLevel::Adequate => return None,
        StockLevel::Low => (
            "Estoque baixo",
            format!(
                "O material {} está com estoque baixo: {} {} restantes.",
                material.name, material.quantity, material.unit
            ),
            Priority::High,
        ),
        StockLevel::Depleted => (
            "Estoque esgotado",
            format!("O material {} está sem estoque.", material.name),
            Priority::Critical,
        ),
    };

    Some(NewNotification {
        title: title.to_string(),
        description,
        category: NotificationCategory::Estoque,
        priority,
        obra_id: material.obra_id,
    })
}
