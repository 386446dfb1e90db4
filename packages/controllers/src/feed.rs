//! Post feed: every post newest first, with optimistic likes.

use std::collections::{HashMap, HashSet};

use store::{EntityStore, Post, Repository, User};
use uuid::Uuid;

use crate::error::ControllerError;
use crate::observable::{Observable, SubscriptionId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedState {
    pub posts: Vec<Post>,
    pub authors: HashMap<Uuid, User>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl FeedState {
    pub fn post(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn author_of(&self, post: &Post) -> Option<&User> {
        self.authors.get(&post.author_id)
    }

    fn post_mut(&mut self, id: Uuid) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }
}

pub struct FeedController<S: EntityStore> {
    repo: Repository<S>,
    state: Observable<FeedState>,
}

impl<S: EntityStore> FeedController<S> {
    pub fn new(repo: Repository<S>) -> Self {
        Self {
            repo,
            state: Observable::new(FeedState::default()),
        }
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn state(&self) -> FeedState {
        self.state.snapshot()
    }

    pub fn subscribe(&self, f: impl Fn(&FeedState) + 'static) -> SubscriptionId {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Load every post with its authors. Skipped while a load is in flight.
    pub async fn load_posts(&self) -> Result<usize, ControllerError> {
        if !self.repo.is_ready() {
            return Err(self.surface(ControllerError::StoreUnavailable));
        }
        let started = self.state.update(|state| {
            if state.is_loading {
                return false;
            }
            state.is_loading = true;
            state.error_message = None;
            true
        });
        if !started {
            return Ok(0);
        }

        match self.fetch().await {
            Ok((posts, authors)) => {
                let count = posts.len();
                self.state.update(|state| {
                    state.posts = posts;
                    state.authors = authors.into_iter().map(|u| (u.id, u)).collect();
                    state.is_loading = false;
                });
                tracing::debug!(count, "loaded posts");
                Ok(count)
            }
            Err(e) => {
                self.state.update(|state| state.is_loading = false);
                Err(self.surface(e))
            }
        }
    }

    pub async fn refresh(&self) -> Result<usize, ControllerError> {
        self.load_posts().await
    }

    /// Flip the liked flag and counter at once; put them back if the write
    /// fails. Returns the new flag.
    pub async fn toggle_like(&self, post_id: Uuid) -> Result<bool, ControllerError> {
        if !self.repo.is_ready() {
            return Err(self.surface(ControllerError::StoreUnavailable));
        }
        let toggled = self.state.update(|state| {
            state.post_mut(post_id).map(|post| {
                post.toggle_like();
                post.clone()
            })
        });
        let Some(post) = toggled else {
            return Err(self.surface(ControllerError::UnknownPost(post_id)));
        };

        match self.repo.save_post(&post).await {
            Ok(()) => Ok(post.is_liked),
            Err(e) => {
                self.state.update(|state| {
                    if let Some(p) = state.post_mut(post_id) {
                        p.toggle_like();
                    }
                });
                Err(self.surface(ControllerError::WriteFailure(e)))
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.update(|state| state.error_message = None);
    }

    async fn fetch(&self) -> Result<(Vec<Post>, Vec<User>), ControllerError> {
        let posts = self.repo.posts().await.map_err(ControllerError::ReadFailure)?;
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.author_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let authors = self
            .repo
            .users_by_ids(ids)
            .await
            .map_err(ControllerError::ReadFailure)?;
        Ok((posts, authors))
    }

    fn surface(&self, error: ControllerError) -> ControllerError {
        tracing::warn!("feed: {error}");
        let message = error.to_string();
        self.state.update(|state| state.error_message = Some(message));
        error
    }
}
