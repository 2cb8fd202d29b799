//! Obras and their kanban tasks.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use nexium_audit::{AuditAction, AuditEntityType, NewAuditEntry};
use nexium_core::{Actor, ObraId, TaskId};
use nexium_geocoding::{AddressResolver, GeocodeResult};
use nexium_sites::{CreateObra, CreateTask, Obra, Task, TaskBoard, TaskStatus, UpdateObra};

use crate::SharedAuditLog;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;
use crate::store::{Query, RecordStore};

#[derive(Clone)]
pub struct SiteService {
    obras: Repository<Obra>,
    tasks: Repository<Task>,
    geocoder: Option<AddressResolver>,
    audit: SharedAuditLog,
}

impl SiteService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        geocoder: Option<AddressResolver>,
        audit: SharedAuditLog,
    ) -> Self {
        Self {
            obras: Repository::new(store.clone()),
            tasks: Repository::new(store),
            geocoder,
            audit,
        }
    }

    /// Look up an address, optionally answering from the city table when the
    /// search service has nothing.
    pub async fn geocode(
        &self,
        address: &str,
        use_fallback: bool,
    ) -> ServiceResult<Option<GeocodeResult>> {
        let Some(geocoder) = &self.geocoder else {
            return Err(ServiceError::Lookup("geocoding is not configured".to_string()));
        };
        let hit = if use_fallback {
            geocoder.resolve_or_fallback(address).await?
        } else {
            geocoder.resolve(address).await?
        };
        Ok(hit)
    }

    /// Create an obra. Missing coordinates are filled from the address when a
    /// geocoder is configured; a failed lookup does not fail the creation.
    pub async fn create_obra(&self, cmd: CreateObra, actor: Actor) -> ServiceResult<Obra> {
        let mut obra = Obra::create(cmd, Utc::now())?;

        if !obra.has_coordinates() && !obra.address.is_empty() {
            if let Some(geocoder) = &self.geocoder {
                match geocoder.resolve_or_fallback(&obra.address).await {
                    Ok(Some(hit)) => obra.set_coordinates(hit.latitude, hit.longitude)?,
                    Ok(None) => tracing::debug!(address = %obra.address, "no coordinates found"),
                    Err(e) => tracing::warn!(error = %e, "geocoding failed; obra saved without coordinates"),
                }
            }
        }

        let obra = self.obras.insert(&obra).await?;
        self.audit.append(NewAuditEntry::new(
            AuditAction::Create,
            AuditEntityType::Obra,
            obra.id,
            format!("Obra {} criada", obra.name),
            actor,
        ));
        Ok(obra)
    }

    pub async fn get_obra(&self, id: ObraId) -> ServiceResult<Obra> {
        self.obras
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("obra {id}")))
    }

    /// All obras, newest first.
    pub async fn list_obras(&self) -> ServiceResult<Vec<Obra>> {
        Ok(self.obras.list(&Query::new().newest_first()).await?)
    }

    pub async fn update_obra(
        &self,
        id: ObraId,
        update: UpdateObra,
        actor: Actor,
    ) -> ServiceResult<Obra> {
        let mut obra = self.get_obra(id).await?;
        let previous_status = obra.status;
        obra.apply_update(update)?;
        let obra = self.obras.save(&obra).await?;

        let (action, details) = if obra.status != previous_status {
            (
                AuditAction::StatusChange,
                format!(
                    "Obra {} mudou de {:?} para {:?}",
                    obra.name, previous_status, obra.status
                ),
            )
        } else {
            (AuditAction::Update, format!("Obra {} atualizada", obra.name))
        };
        self.audit.append(NewAuditEntry::new(
            action,
            AuditEntityType::Obra,
            obra.id,
            details,
            actor,
        ));
        Ok(obra)
    }

    /// Delete an obra together with its tasks.
    pub async fn delete_obra(&self, id: ObraId, actor: Actor) -> ServiceResult<()> {
        let obra = self.get_obra(id).await?;
        let tasks = self.list_tasks(id).await?;
        for task in &tasks {
            self.tasks.delete(task.id).await?;
        }
        self.obras.delete(id).await?;

        tracing::info!(obra_id = %id, tasks = tasks.len(), "obra deleted");
        self.audit.append(NewAuditEntry::new(
            AuditAction::Delete,
            AuditEntityType::Obra,
            id,
            format!("Obra {} excluída com {} tarefas", obra.name, tasks.len()),
            actor,
        ));
        Ok(())
    }

    pub async fn create_task(
        &self,
        obra_id: ObraId,
        cmd: CreateTask,
        actor: Actor,
    ) -> ServiceResult<Task> {
        let obra = self.get_obra(obra_id).await?;
        let task = Task::create(obra.id, cmd, Utc::now())?;
        let task = self.tasks.insert(&task).await?;

        self.audit.append(NewAuditEntry::new(
            AuditAction::Create,
            AuditEntityType::Tarefa,
            task.id,
            format!("Tarefa {} criada na obra {}", task.title, obra.name),
            actor,
        ));
        Ok(task)
    }

    pub async fn get_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.tasks
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("task {id}")))
    }

    /// Tasks of an obra, oldest first.
    pub async fn list_tasks(&self, obra_id: ObraId) -> ServiceResult<Vec<Task>> {
        let query = Query::new()
            .eq(Task::OBRA_FIELD, json!(obra_id))
            .oldest_first();
        Ok(self.tasks.list(&query).await?)
    }

    pub async fn board(&self, obra_id: ObraId) -> ServiceResult<TaskBoard> {
        self.get_obra(obra_id).await?;
        Ok(TaskBoard::from_tasks(self.list_tasks(obra_id).await?))
    }

    /// Move a task to another kanban column. Moving to the current column is
    /// a no-op and is not audited.
    pub async fn move_task(
        &self,
        id: TaskId,
        status: TaskStatus,
        actor: Actor,
    ) -> ServiceResult<Task> {
        let mut task = self.get_task(id).await?;
        let Some(previous) = task.move_to(status) else {
            return Ok(task);
        };
        let task = self.tasks.save(&task).await?;

        self.audit.append(NewAuditEntry::new(
            AuditAction::StatusChange,
            AuditEntityType::Tarefa,
            task.id,
            format!("Tarefa {} movida de {:?} para {:?}", task.title, previous, task.status),
            actor,
        ));
        Ok(task)
    }

    pub async fn delete_task(&self, id: TaskId, actor: Actor) -> ServiceResult<()> {
        let task = self.get_task(id).await?;
        self.tasks.delete(id).await?;
        self.audit.append(NewAuditEntry::new(
            AuditAction::Delete,
            AuditEntityType::Tarefa,
            id,
            format!("Tarefa {} excluída", task.title),
            actor,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexium_audit::{AuditLog, AuditStorage, InMemoryAuditStorage};
    use nexium_geocoding::GeocoderConfig;
    use nexium_sites::{ObraStatus, TaskPriority};
    use std::time::Duration;

    use crate::store::InMemoryRecordStore;

    fn audit() -> SharedAuditLog {
        let storage: Arc<dyn AuditStorage> = Arc::new(InMemoryAuditStorage::new());
        Arc::new(AuditLog::new(storage))
    }

    fn service_with(geocoder: Option<AddressResolver>) -> (SiteService, SharedAuditLog) {
        let audit = audit();
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        (SiteService::new(store, geocoder, audit.clone()), audit)
    }

    fn actor() -> Actor {
        Actor::new("eng. marta").unwrap()
    }

    fn create(name: &str, address: &str) -> CreateObra {
        CreateObra {
            name: name.to_string(),
            address: address.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn task(title: &str) -> CreateTask {
        CreateTask {
            title: title.to_string(),
            description: String::new(),
            priority: TaskPriority::Medium,
            assignee: None,
        }
    }

    #[tokio::test]
    async fn obras_are_listed_newest_first() {
        let (svc, _) = service_with(None);
        svc.create_obra(create("Residencial Aurora", ""), actor()).await.unwrap();
        svc.create_obra(create("Galpão Norte", ""), actor()).await.unwrap();

        let names: Vec<String> = svc
            .list_obras()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["Galpão Norte", "Residencial Aurora"]);
    }

    #[tokio::test]
    async fn unreachable_geocoder_falls_back_to_city_table() {
        // Nothing listens on port 9 locally, so the lookup fails fast.
        let geocoder = AddressResolver::new(GeocoderConfig {
            endpoint: "http://127.0.0.1:9/search".to_string(),
            timeout: Duration::from_secs(2),
            ..GeocoderConfig::default()
        })
        .unwrap();
        let (svc, _) = service_with(Some(geocoder));

        let obra = svc
            .create_obra(create("Edifício Sol", "Rua das Flores, 100, Curitiba"), actor())
            .await
            .unwrap();
        assert!(obra.has_coordinates());

        let far = svc
            .create_obra(create("Obra rural", "Estrada vicinal km 12"), actor())
            .await
            .unwrap();
        assert!(!far.has_coordinates());
    }

    #[tokio::test]
    async fn concluding_an_obra_is_audited_as_status_change() {
        let (svc, audit) = service_with(None);
        let obra = svc.create_obra(create("Reforma Escola", ""), actor()).await.unwrap();

        let updated = svc
            .update_obra(
                obra.id,
                UpdateObra {
                    status: Some(ObraStatus::Concluida),
                    ..UpdateObra::default()
                },
                actor(),
            )
            .await
            .unwrap();

        assert_eq!(updated.progress, 100);
        assert_eq!(svc.get_obra(obra.id).await.unwrap().status, ObraStatus::Concluida);
        assert_eq!(audit.load()[0].action, AuditAction::StatusChange);
    }

    #[tokio::test]
    async fn tasks_require_an_existing_obra() {
        let (svc, _) = service_with(None);
        assert!(matches!(
            svc.create_task(ObraId::new(), task("Sondagem"), actor()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn moving_a_task_updates_the_board() {
        let (svc, audit) = service_with(None);
        let obra = svc.create_obra(create("Ponte do Rio", ""), actor()).await.unwrap();
        let t1 = svc.create_task(obra.id, task("Fundação"), actor()).await.unwrap();
        svc.create_task(obra.id, task("Tabuleiro"), actor()).await.unwrap();

        svc.move_task(t1.id, TaskStatus::InProgress, actor()).await.unwrap();
        let entries_before = audit.load().len();
        svc.move_task(t1.id, TaskStatus::InProgress, actor()).await.unwrap();
        assert_eq!(audit.load().len(), entries_before);

        let board = svc.board(obra.id).await.unwrap();
        assert_eq!(board.in_progress.len(), 1);
        assert_eq!(board.in_progress[0].title, "Fundação");
        assert_eq!(board.todo.len(), 1);
    }

    #[tokio::test]
    async fn deleting_an_obra_removes_its_tasks() {
        let (svc, _) = service_with(None);
        let obra = svc.create_obra(create("Muro de arrimo", ""), actor()).await.unwrap();
        let t = svc.create_task(obra.id, task("Escavação"), actor()).await.unwrap();

        svc.delete_obra(obra.id, actor()).await.unwrap();

        assert!(matches!(svc.get_obra(obra.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get_task(t.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn geocode_without_resolver_is_a_lookup_error() {
        let (svc, _) = service_with(None);
        assert!(matches!(
            svc.geocode("Avenida Paulista, São Paulo", false).await,
            Err(ServiceError::Lookup(_))
        ));
    }
}
