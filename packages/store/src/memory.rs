use std::sync::{Arc, Mutex, MutexGuard};

use crate::collections::Collections;
use crate::error::StoreError;
use crate::repo::{Entity, EntityKind, EntityStore, FetchRequest};

/// In-memory EntityStore for testing and previews.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl EntityStore for MemoryStore {
    async fn fetch<E: Entity>(&self, request: &FetchRequest) -> Result<Vec<E>, StoreError> {
        self.tables()?.fetch(request)
    }

    async fn save<E: Entity>(&self, entities: &[E]) -> Result<(), StoreError> {
        self.tables()?.save(entities)
    }

    async fn batch_delete(&self, kind: EntityKind) -> Result<usize, StoreError> {
        Ok(self.tables()?.batch_delete(kind))
    }

    async fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        Ok(self.tables()?.count(kind))
    }
}
