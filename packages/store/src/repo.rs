//! # Repository — typed domain operations on an abstract entity store
//!
//! This module is the core of the storage layer. All persistence goes through the
//! [`EntityStore`] trait, so the same controllers work against the in-memory store
//! (tests, previews), the file-backed store (desktop and mobile), or any future
//! backend. [`Repository`] layers the app's domain queries on top of it.
//!
//! ## [`EntityStore`] trait
//!
//! An async CRUD interface over three entity kinds ([`EntityKind`]):
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`fetch`](EntityStore::fetch) | Filter / sort / limit / offset query, returns owned copies. |
//! | [`save`](EntityStore::save) | Upsert a batch. Rejects posts and stories whose owner does not exist. |
//! | [`batch_delete`](EntityStore::batch_delete) | Remove every entity of one kind, returning how many were removed. |
//! | [`count`](EntityStore::count) | Number of stored entities of one kind. |
//! | [`is_ready`](EntityStore::is_ready) | Whether the backend is open; callers treat `false` as "store unavailable". |
//!
//! Entities are values, not handles: there is no versioning, the last save wins.
//!
//! ## Ordering
//!
//! Fetches return the newest entity first and break timestamp ties
//! by ascending id, so offset pagination over an unchanged store never returns the
//! same entity twice.
//!
//! ## [`Repository`] read path
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`stories_page`](Repository::stories_page) | One page of stories, newest first. |
//! | [`posts`](Repository::posts) | Every post, newest first. |
//! | [`users_by_ids`](Repository::users_by_ids) | Resolve a set of author ids. |
//! | [`user_count`](Repository::user_count) | Used to decide first-launch seeding. |
//!
//! ## [`Repository`] write path
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`save_story`](Repository::save_story) / [`save_post`](Repository::save_post) | Persist a single mutated entity. |
//! | [`save_users`](Repository::save_users) / [`save_stories`](Repository::save_stories) / [`save_posts`](Repository::save_posts) | Batch inserts used by the seeder. |
//! | [`delete_all_stories`](Repository::delete_all_stories) | Batch delete before regeneration. |

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Post, Story, User};

/// The kinds of entity a store holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Post,
    Story,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Post => "post",
            EntityKind::Story => "story",
        };
        f.write_str(name)
    }
}

/// A persistable entity.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Sort key; fetches return the newest first.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Owning user, for kinds that have one.
    fn owner(&self) -> Option<Uuid> {
        None
    }
}

/// Which entities a fetch selects.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Filter {
    #[default]
    All,
    Ids(Vec<Uuid>),
    Owner(Uuid),
}

impl Filter {
    pub fn matches(&self, id: Uuid, owner: Option<Uuid>) -> bool {
        match self {
            Filter::All => true,
            Filter::Ids(ids) => ids.contains(&id),
            Filter::Owner(user) => owner == Some(*user),
        }
    }
}

/// A fetch query: filter, limit and offset. Results are always newest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchRequest {
    pub filter: Filter,
    /// `None` means no limit.
    pub limit: Option<usize>,
    pub offset: usize,
}

impl FetchRequest {
    /// Every entity, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// One page, newest first.
    pub fn page(offset: usize, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}

/// Async CRUD interface over persisted entities.
pub trait EntityStore {
    /// Whether the backend is open and usable.
    fn is_ready(&self) -> bool {
        true
    }

    fn fetch<E: Entity>(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<E>, StoreError>>;

    fn save<E: Entity>(&self, entities: &[E]) -> impl Future<Output = Result<(), StoreError>>;

    fn batch_delete(&self, kind: EntityKind) -> impl Future<Output = Result<usize, StoreError>>;

    fn count(&self, kind: EntityKind) -> impl Future<Output = Result<usize, StoreError>>;
}

/// Domain queries backed by an [`EntityStore`].
#[derive(Clone, Debug)]
pub struct Repository<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    /// Fetch one page of stories, newest first.
    pub async fn stories_page(&self, offset: usize, limit: usize) -> Result<Vec<Story>, StoreError> {
        self.store.fetch(&FetchRequest::page(offset, limit)).await
    }

    /// Fetch every post, newest first.
    pub async fn posts(&self) -> Result<Vec<Post>, StoreError> {
        self.store.fetch(&FetchRequest::all()).await
    }

    /// Resolve the given user ids. Unknown ids are skipped.
    pub async fn users_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .fetch(&FetchRequest::all().with_filter(Filter::Ids(ids)))
            .await
    }

    pub async fn user_count(&self) -> Result<usize, StoreError> {
        self.store.count(EntityKind::User).await
    }

    pub async fn save_story(&self, story: &Story) -> Result<(), StoreError> {
        self.store.save(std::slice::from_ref(story)).await
    }

    pub async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        self.store.save(std::slice::from_ref(post)).await
    }

    pub async fn save_users(&self, users: &[User]) -> Result<(), StoreError> {
        self.store.save(users).await
    }

    pub async fn save_stories(&self, stories: &[Story]) -> Result<(), StoreError> {
        self.store.save(stories).await
    }

    pub async fn save_posts(&self, posts: &[Post]) -> Result<(), StoreError> {
        self.store.save(posts).await
    }

    /// Remove every story. Returns the number removed.
    pub async fn delete_all_stories(&self) -> Result<usize, StoreError> {
        self.store.batch_delete(EntityKind::Story).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();

        assert!(Filter::All.matches(id, None));
        assert!(Filter::Ids(vec![id]).matches(id, None));
        assert!(!Filter::Ids(vec![owner]).matches(id, None));
        assert!(Filter::Owner(owner).matches(id, Some(owner)));
        assert!(!Filter::Owner(owner).matches(id, None));
    }

    #[test]
    fn test_page_request() {
        let req = FetchRequest::page(40, 20);
        assert_eq!(req.offset, 40);
        assert_eq!(req.limit, Some(20));
        assert_eq!(req.filter, Filter::All);
    }
}
