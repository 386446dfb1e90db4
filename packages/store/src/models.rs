//! # Domain models for users, posts and stories
//!
//! These are the three entity kinds persisted by an [`crate::EntityStore`]. They
//! are plain `Serialize + Deserialize` values: the store keeps its own copy, and a
//! caller that wants to change an entity clones it, mutates the clone and hands it
//! back to [`crate::EntityStore::save`].
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | A profile. Created by the seeder, only its counters change afterwards. |
//! | [`Post`] | A feed item owned by one [`User`]. Mutated by like toggles. |
//! | [`Story`] | An ephemeral media item owned by one [`User`]. Mutated by viewed/liked toggles, regenerated wholesale on refresh. |
//!
//! Ownership is expressed by id (`author_id`), never by embedding the [`User`]:
//! the store checks that the owner exists when a post or story is saved.
//!
//! ## Helper functions
//!
//! - [`time_ago`] — renders a timestamp relative to "now" the way story headers
//!   display it (`"Just now"`, `"12m ago"`, `"3h ago"`, `"2d ago"`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repo::{Entity, EntityKind};

/// A user profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Handle without the leading `@`: "jane_smith"
    pub username: String,
    /// Display name: "Jane Smith"
    pub full_name: String,
    pub avatar_url: String,
    pub bio: String,
    pub followers: u32,
    pub following: u32,
    pub posts: u32,
    pub created_at: DateTime<Utc>,
}

/// A feed post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub caption: String,
    pub media_url: String,
    pub likes: u32,
    pub comments: u32,
    pub timestamp: DateTime<Utc>,
    pub author_id: Uuid,
    pub is_liked: bool,
}

/// Kind of media a story carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// A story.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    /// Optional overlay text
    pub content: Option<String>,
    pub media_url: String,
    pub media_kind: MediaKind,
    pub timestamp: DateTime<Utc>,
    /// Suggested viewing time in seconds
    pub duration_hint: f64,
    pub author_id: Uuid,
    pub is_viewed: bool,
    pub is_liked: bool,
}

impl Post {
    /// Flip the liked flag and adjust the like counter accordingly.
    pub fn toggle_like(&mut self) {
        self.is_liked = !self.is_liked;
        if self.is_liked {
            self.likes = self.likes.saturating_add(1);
        } else {
            self.likes = self.likes.saturating_sub(1);
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Post {
    const KIND: EntityKind = EntityKind::Post;

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn owner(&self) -> Option<Uuid> {
        Some(self.author_id)
    }
}

impl Entity for Story {
    const KIND: EntityKind = EntityKind::Story;

    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn owner(&self) -> Option<Uuid> {
        Some(self.author_id)
    }
}

/// Render `then` relative to `now`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        "Just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}
