//! Service wiring: picks the record store and audit storage from config.

use std::sync::Arc;

use anyhow::Context;

use nexium_audit::{AuditLog, AuditStorage, FileAuditStorage, InMemoryAuditStorage};
use nexium_geocoding::AddressResolver;
use nexium_infra::SharedAuditLog;
use nexium_infra::config::{AppConfig, StoreConfig};
use nexium_infra::notifications::NotificationService;
use nexium_infra::sites::SiteService;
use nexium_infra::stock::StockService;
use nexium_infra::store::{InMemoryRecordStore, PostgresRecordStore, RecordStore};

/// Everything the handlers need, shared behind one `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub stock: StockService,
    pub sites: SiteService,
    pub notifications: NotificationService,
    pub audit: SharedAuditLog,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn RecordStore>,
        audit_storage: Arc<dyn AuditStorage>,
        geocoder: Option<AddressResolver>,
    ) -> Self {
        let audit: SharedAuditLog = Arc::new(AuditLog::new(audit_storage));
        Self {
            stock: StockService::new(store.clone(), audit.clone()),
            sites: SiteService::new(store.clone(), geocoder, audit.clone()),
            notifications: NotificationService::new(store),
            audit,
        }
    }

    /// In-memory stores (dev/test).
    pub fn in_memory(geocoder: Option<AddressResolver>) -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryAuditStorage::new()),
            geocoder,
        )
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn RecordStore> = match &config.store {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory record store");
            Arc::new(InMemoryRecordStore::new())
        }
        StoreConfig::Postgres { database_url } => {
            let store = PostgresRecordStore::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            store.migrate().await.context("failed to create nexium_records table")?;
            tracing::info!("using Postgres record store");
            Arc::new(store)
        }
    };

    let audit_storage: Arc<dyn AuditStorage> = match &config.audit_log_dir {
        Some(dir) => {
            let storage = FileAuditStorage::new(dir);
            tracing::info!(path = %storage.path().display(), "using file audit log");
            Arc::new(storage)
        }
        None => Arc::new(InMemoryAuditStorage::new()),
    };

    let geocoder =
        AddressResolver::new(config.geocoder.clone()).context("failed to build geocoding client")?;

    Ok(AppServices::new(store, audit_storage, Some(geocoder)))
}
