//! Infrastructure layer: record storage, repositories, application services
//! and configuration.

use std::sync::Arc;

use nexium_audit::{AuditLog, AuditStorage};

pub mod config;
pub mod error;
pub mod notifications;
pub mod repository;
pub mod sites;
pub mod stock;
pub mod store;

pub use error::{ServiceError, ServiceResult};

/// The audit log shared by every service, over whichever storage was configured.
pub type SharedAuditLog = Arc<AuditLog<Arc<dyn AuditStorage>>>;
