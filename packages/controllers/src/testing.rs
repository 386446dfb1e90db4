//! Store wrapper with switchable failures, shared by the controller tests.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use store::{
    Entity, EntityKind, EntityStore, FetchRequest, MediaKind, MemoryStore, Post, Repository,
    Story, StoreError, User,
};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Faults {
    pub ready: Cell<bool>,
    pub fail_reads: Cell<bool>,
    pub fail_writes: Cell<bool>,
    pub fail_deletes: Cell<bool>,
    /// Yield once inside every fetch so concurrent futures can interleave.
    pub yield_on_fetch: Cell<bool>,
    pub fetches: Cell<usize>,
}

#[derive(Clone, Debug)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub faults: Rc<Faults>,
}

impl FlakyStore {
    pub fn new() -> Self {
        let faults = Faults::default();
        faults.ready.set(true);
        Self {
            inner: MemoryStore::new(),
            faults: Rc::new(faults),
        }
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Backend(format!("injected {what} failure"))
}

impl EntityStore for FlakyStore {
    fn is_ready(&self) -> bool {
        self.faults.ready.get()
    }

    async fn fetch<E: Entity>(&self, request: &FetchRequest) -> Result<Vec<E>, StoreError> {
        self.faults.fetches.set(self.faults.fetches.get() + 1);
        if self.faults.yield_on_fetch.get() {
            tokio::task::yield_now().await;
        }
        if self.faults.fail_reads.get() {
            return Err(injected("read"));
        }
        self.inner.fetch(request).await
    }

    async fn save<E: Entity>(&self, entities: &[E]) -> Result<(), StoreError> {
        if self.faults.fail_writes.get() {
            return Err(injected("write"));
        }
        self.inner.save(entities).await
    }

    async fn batch_delete(&self, kind: EntityKind) -> Result<usize, StoreError> {
        if self.faults.fail_deletes.get() {
            return Err(injected("delete"));
        }
        self.inner.batch_delete(kind).await
    }

    async fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        if self.faults.fail_reads.get() {
            return Err(injected("read"));
        }
        self.inner.count(kind).await
    }
}

pub fn user(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: name.to_lowercase(),
        full_name: name.to_string(),
        avatar_url: format!("https://example.com/{name}.png"),
        bio: String::new(),
        followers: 0,
        following: 0,
        posts: 0,
        created_at: Utc::now(),
    }
}

pub fn story(author: &User, at: DateTime<Utc>) -> Story {
    Story {
        id: Uuid::new_v4(),
        content: None,
        media_url: "https://picsum.photos/400/800".to_string(),
        media_kind: MediaKind::Image,
        timestamp: at,
        duration_hint: 5.0,
        author_id: author.id,
        is_viewed: false,
        is_liked: false,
    }
}

pub fn post(author: &User, at: DateTime<Utc>, likes: u32) -> Post {
    Post {
        id: Uuid::new_v4(),
        caption: format!("post by {}", author.username),
        media_url: "https://picsum.photos/400/400".to_string(),
        likes,
        comments: 0,
        timestamp: at,
        author_id: author.id,
        is_liked: false,
    }
}

/// Three authors, two stories each, saved newest first as
/// A1 (now), B1 (-1m), C1 (-2m), A2 (-3m), B2 (-4m), C2 (-5m).
pub async fn three_authors(repo: &Repository<FlakyStore>) -> ([User; 3], Vec<Story>) {
    let users = [user("Alice"), user("Bob"), user("Carol")];
    let now = Utc::now();
    let stories: Vec<Story> = (0..6)
        .map(|i| story(&users[i % 3], now - Duration::minutes(i as i64)))
        .collect();
    repo.save_users(&users).await.unwrap();
    repo.save_stories(&stories).await.unwrap();
    (users, stories)
}
