//! Entity store boundary.
//!
//! The engine never assumes a storage technology: hosts implement
//! [`EntityStore`] over whatever backend they use. Writes go through a
//! compare-and-swap on the entity version; callers that receive
//! [`WorkflowError::Conflict`] reload and retry themselves.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::WorkflowError;

/// Entities carrying an id and an optimistic-concurrency version.
pub trait Versioned {
    fn id(&self) -> Uuid;
    fn version(&self) -> i64;
    fn set_version(&mut self, version: i64);
}

#[async_trait]
pub trait EntityStore<T>: Send + Sync
where
    T: Versioned + Clone + Send + Sync,
{
    async fn load(&self, id: Uuid) -> Result<T, WorkflowError>;

    /// Inserts a new entity; fails with `Conflict` if the id already exists.
    async fn insert(&self, entity: T) -> Result<T, WorkflowError>;

    /// Persists an updated entity. The stored version must match the
    /// entity's version; on success the version is bumped.
    async fn save(&self, entity: T) -> Result<T, WorkflowError>;

    async fn list(&self) -> Result<Vec<T>, WorkflowError>;
}

/// In-memory store used by tests and by hosts while a real backend is
/// being wired up.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    entries: DashMap<Uuid, T>,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> EntityStore<T> for InMemoryStore<T>
where
    T: Versioned + Clone + Send + Sync + 'static,
{
    async fn load(&self, id: Uuid) -> Result<T, WorkflowError> {
        self.entries
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| WorkflowError::NotFound(format!("entity {} not found", id)))
    }

    async fn insert(&self, entity: T) -> Result<T, WorkflowError> {
        let id = entity.id();
        if self.entries.contains_key(&id) {
            return Err(WorkflowError::Conflict(format!(
                "entity {} already exists",
                id
            )));
        }
        self.entries.insert(id, entity.clone());
        Ok(entity)
    }

    async fn save(&self, mut entity: T) -> Result<T, WorkflowError> {
        let id = entity.id();
        let mut current = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| WorkflowError::NotFound(format!("entity {} not found", id)))?;
        if current.version() != entity.version() {
            return Err(WorkflowError::Conflict(format!(
                "entity {} was modified concurrently (stored version {}, provided {})",
                id,
                current.version(),
                entity.version()
            )));
        }
        entity.set_version(entity.version() + 1);
        *current = entity.clone();
        Ok(entity)
    }

    async fn list(&self) -> Result<Vec<T>, WorkflowError> {
        Ok(self.entries.iter().map(|entry| entry.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialRequest, MaterialRequestItem, RequestStatus};
    use rust_decimal_macros::dec;

    fn sample_request() -> MaterialRequest {
        let mut request =
            MaterialRequest::new("RM-2026-0001".into(), Uuid::new_v4(), Uuid::new_v4());
        request
            .items
            .push(MaterialRequestItem::new(Uuid::new_v4(), dec!(10), dec!(5)));
        request.recalculate_totals();
        request
    }

    #[tokio::test]
    async fn round_trip_preserves_status_and_quantities() {
        let store = InMemoryStore::new();
        let request = sample_request();
        let id = request.id;
        store.insert(request.clone()).await.unwrap();

        let loaded = store.load(id).await.unwrap();
        assert_eq!(loaded, request);
        assert_eq!(loaded.status, RequestStatus::Draft);
        assert_eq!(loaded.items[0].requested_qty, dec!(10));
    }

    #[tokio::test]
    async fn load_missing_entity_is_not_found() {
        let store: InMemoryStore<MaterialRequest> = InMemoryStore::new();
        let err = store.load(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = InMemoryStore::new();
        let request = sample_request();
        store.insert(request.clone()).await.unwrap();
        let err = store.insert(request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn save_bumps_version() {
        let store = InMemoryStore::new();
        let request = sample_request();
        let id = request.id;
        store.insert(request.clone()).await.unwrap();

        let saved = store.save(request).await.unwrap();
        assert_eq!(saved.version, 2);
        assert_eq!(store.load(id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn stale_save_conflicts() {
        let store = InMemoryStore::new();
        let request = sample_request();
        store.insert(request.clone()).await.unwrap();

        let stale = request.clone();
        store.save(request).await.unwrap();
        let err = store.save(stale).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }
}
