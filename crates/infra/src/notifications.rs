//! Notification inbox.

use std::sync::Arc;

use serde_json::json;

use nexium_core::NotificationId;
use nexium_inventory::Notification;

use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;
use crate::store::{Query, RecordStore};

#[derive(Clone)]
pub struct NotificationService {
    notifications: Repository<Notification>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            notifications: Repository::new(store),
        }
    }

    /// Non-archived notifications, newest first.
    pub async fn list(&self, unread_only: bool) -> ServiceResult<Vec<Notification>> {
        let mut query = Query::new().eq(Notification::ARCHIVED_FIELD, false);
        if unread_only {
            query = query.eq(Notification::READ_FIELD, false);
        }
        Ok(self.notifications.list(&query.newest_first()).await?)
    }

    pub async fn mark_read(&self, id: NotificationId) -> ServiceResult<Notification> {
        self.set_flag(id, Notification::READ_FIELD).await
    }

    pub async fn archive(&self, id: NotificationId) -> ServiceResult<Notification> {
        self.set_flag(id, Notification::ARCHIVED_FIELD).await
    }

    async fn set_flag(&self, id: NotificationId, field: &str) -> ServiceResult<Notification> {
        if self.notifications.get(id).await?.is_none() {
            return Err(ServiceError::not_found(format!("notification {id}")));
        }
        let mut patch = serde_json::Map::new();
        patch.insert(field.to_string(), json!(true));
        Ok(self.notifications.update(id, patch.into()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use nexium_inventory::{NewNotification, NotificationCategory, Priority};

    use crate::store::InMemoryRecordStore;

    async fn seeded() -> (NotificationService, Vec<Notification>) {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let repo: Repository<Notification> = Repository::new(store.clone());
        let mut seeded = Vec::new();
        for (i, title) in ["Estoque baixo", "Estoque esgotado", "Prazo da obra"].iter().enumerate() {
            let n = NewNotification {
                title: title.to_string(),
                description: String::new(),
                category: NotificationCategory::Estoque,
                priority: Priority::High,
                obra_id: None,
            }
            .into_notification(NotificationId::new(), Utc::now() + Duration::seconds(i as i64));
            seeded.push(repo.insert(&n).await.unwrap());
        }
        (NotificationService::new(store), seeded)
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let (svc, _) = seeded().await;
        let titles: Vec<String> = svc.list(false).await.unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Prazo da obra", "Estoque esgotado", "Estoque baixo"]);
    }

    #[tokio::test]
    async fn read_and_archived_are_filtered() {
        let (svc, seeded) = seeded().await;
        let read = svc.mark_read(seeded[0].id).await.unwrap();
        assert!(read.read);
        svc.archive(seeded[1].id).await.unwrap();

        let unread = svc.list(true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, seeded[2].id);

        let visible = svc.list(false).await.unwrap();
        assert_eq!(visible.len(), 2);
    }

    #[tokio::test]
    async fn unknown_notification_is_not_found() {
        let (svc, _) = seeded().await;
        assert!(matches!(
            svc.mark_read(NotificationId::new()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
