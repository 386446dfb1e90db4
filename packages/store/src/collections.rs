//! # Entity tables shared by the in-memory and file-backed stores
//!
//! [`Collections`] holds one table per [`EntityKind`]. Each row keeps the entity
//! as a JSON value plus the two fields the store needs without deserializing it:
//! its sort timestamp and its owner. Both [`crate::MemoryStore`] and
//! [`crate::FileStore`] delegate every operation here; they only differ in where
//! the tables live between calls.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::repo::{Entity, EntityKind, FetchRequest};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Row {
    id: Uuid,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    owner: Option<Uuid>,
    body: serde_json::Value,
}

/// All persisted entities, keyed by kind then id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    users: BTreeMap<Uuid, Row>,
    #[serde(default)]
    posts: BTreeMap<Uuid, Row>,
    #[serde(default)]
    stories: BTreeMap<Uuid, Row>,
}

impl Collections {
    fn table(&self, kind: EntityKind) -> &BTreeMap<Uuid, Row> {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Post => &self.posts,
            EntityKind::Story => &self.stories,
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<Uuid, Row> {
        match kind {
            EntityKind::User => &mut self.users,
            EntityKind::Post => &mut self.posts,
            EntityKind::Story => &mut self.stories,
        }
    }

    pub fn fetch<E: Entity>(&self, request: &FetchRequest) -> Result<Vec<E>, StoreError> {
        let mut rows: Vec<&Row> = self
            .table(E::KIND)
            .values()
            .filter(|row| request.filter.matches(row.id, row.owner))
            .collect();

        rows.sort_by(|a, b| match b.timestamp.cmp(&a.timestamp) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        });

        rows.into_iter()
            .skip(request.offset)
            .take(request.limit.unwrap_or(usize::MAX))
            .map(|row| serde_json::from_value(row.body.clone()).map_err(StoreError::from))
            .collect()
    }

    /// Upsert a batch. Nothing is written if any entity fails validation.
    pub fn save<E: Entity>(&mut self, entities: &[E]) -> Result<(), StoreError> {
        let mut rows = Vec::with_capacity(entities.len());
        for entity in entities {
            if let Some(owner) = entity.owner() {
                if !self.users.contains_key(&owner) {
                    return Err(StoreError::MissingOwner {
                        kind: E::KIND,
                        id: entity.id(),
                        owner,
                    });
                }
            }
            rows.push(Row {
                id: entity.id(),
                timestamp: entity.timestamp(),
                owner: entity.owner(),
                body: serde_json::to_value(entity)?,
            });
        }

        let table = self.table_mut(E::KIND);
        for row in rows {
            table.insert(row.id, row);
        }
        Ok(())
    }

    pub fn batch_delete(&mut self, kind: EntityKind) -> usize {
        let table = self.table_mut(kind);
        let removed = table.len();
        table.clear();
        removed
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.table(kind).len()
    }
}
