//! # Demo data — seed feed and generator
//!
//! The app ships a static `users.json` resource listing demo authors. The
//! [`Seeder`] turns it into [`User`] rows and gives each one a random batch of
//! [`Story`] (and, on first launch, [`Post`]) entities.
//!
//! ## Seed feed format
//!
//! ```json
//! { "pages": [ { "users": [ { "id": 1, "name": "Jane Smith",
//!                              "profile_picture_url": "https://..." } ] } ] }
//! ```
//!
//! A missing or unparseable resource is not an error state: it yields an empty
//! [`SeedFeed`] (logged at `warn`), so regeneration simply produces no authors.
//!
//! ## Identity
//!
//! Seeded users get a UUIDv5 derived from the feed's external id, so seeding twice
//! resolves to the same rows. Existing users are never overwritten; only missing
//! ones are inserted.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::error::StoreError;
use crate::models::{MediaKind, Post, Story, User};
use crate::repo::{EntityStore, Repository};

const STORY_CONTENTS: &[&str] = &[
    "Just had the most amazing coffee! ☕️",
    "Beautiful sunset tonight 🌅",
    "Weekend vibes are here! 🎉",
    "Working on something exciting 💻",
    "Perfect weather for a walk 🚶",
    "New book arrived today 📚",
    "Cooking up a storm in the kitchen 🍳",
    "Music session with friends 🎵",
    "Exploring the city today 🏙️",
    "Game night with family 🎮",
    "Morning workout complete 💪",
    "Art project in progress 🎨",
    "Pet cuddles are the best 🐕",
    "Garden looking beautiful today 🌸",
    "Movie night with popcorn 🍿",
    "Road trip adventures 🚗",
    "Beach day was perfect 🏖️",
    "New recipe success! 🥘",
    "Photography session 📸",
    "Yoga session complete 🧘",
];

const POST_CAPTIONS: &[&str] = &[
    "Beautiful sunset at the beach today! 🌅 #sunset #beach",
    "Exploring the mountains this weekend 🏔️ #adventure #hiking",
    "Delicious homemade pizza! 🍕 #food #homemade",
    "City lights at night ✨ #city #night",
    "Coffee and a good book ☕️📚 #slowliving",
];

const DEFAULT_BIO: &str = "Living life to the fullest ✨";

/// One author record from the seed feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: u64,
    pub name: String,
    pub profile_picture_url: String,
}

#[derive(Debug, Deserialize)]
struct SeedPage {
    #[serde(default)]
    users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
struct SeedDocument {
    #[serde(default)]
    pages: Vec<SeedPage>,
}

/// The parsed seed resource.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedFeed {
    pub users: Vec<SeedUser>,
}

impl SeedFeed {
    /// Parse the bundled JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: SeedDocument = serde_json::from_str(json)?;
        Ok(Self {
            users: doc.pages.into_iter().flat_map(|p| p.users).collect(),
        })
    }

    /// Parse the bundled JSON document, treating bad data as "no authors".
    pub fn from_json_or_empty(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            tracing::warn!("seed feed unparseable, no authors will be generated: {e}");
            Self::default()
        })
    }

    /// Read a seed file from disk, treating a missing file as "no authors".
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json_or_empty(&json),
            Err(e) => {
                tracing::warn!(path = %path.display(), "seed feed missing: {e}");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Counts of what a seeding pass inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub stories: usize,
    pub posts: usize,
}

/// Generates demo entities from a [`SeedFeed`].
#[derive(Clone, Debug, Default)]
pub struct Seeder {
    feed: SeedFeed,
    config: SeedConfig,
}

impl Seeder {
    pub fn new(feed: SeedFeed, config: SeedConfig) -> Self {
        Self { feed, config }
    }

    pub fn feed(&self) -> &SeedFeed {
        &self.feed
    }

    /// Stable id for a seed record.
    pub fn user_id(seed: &SeedUser) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("insta-seed-user-{}", seed.id).as_bytes())
    }

    /// Build the user row for a seed record.
    pub fn user<R: Rng>(&self, seed: &SeedUser, rng: &mut R, now: DateTime<Utc>) -> User {
        User {
            id: Self::user_id(seed),
            username: seed.name.to_lowercase().replace(' ', "_"),
            full_name: seed.name.clone(),
            avatar_url: seed.profile_picture_url.clone(),
            bio: DEFAULT_BIO.to_string(),
            followers: rng.gen_range(100..=10_000),
            following: rng.gen_range(50..=500),
            posts: 0,
            created_at: now,
        }
    }

    /// A random batch of stories for `user`, newest at `now` and spaced apart.
    pub fn stories_for<R: Rng>(&self, user: &User, rng: &mut R, now: DateTime<Utc>) -> Vec<Story> {
        let min = self.config.min_stories_per_user;
        let max = self.config.max_stories_per_user.max(min);
        let count = rng.gen_range(min..=max);

        (0..count)
            .map(|i| {
                let content = STORY_CONTENTS.choose(rng).map(|s| s.to_string());
                let image = rng.gen_range(1..=20);
                Story {
                    id: Uuid::new_v4(),
                    content,
                    media_url: format!("https://picsum.photos/400/600?random={image}"),
                    media_kind: MediaKind::Image,
                    timestamp: now - Duration::minutes(self.config.story_spacing_minutes * i as i64),
                    duration_hint: rng.gen_range(3.0..8.0),
                    author_id: user.id,
                    is_viewed: false,
                    is_liked: false,
                }
            })
            .collect()
    }

    /// A batch of posts for `user`.
    pub fn posts_for<R: Rng>(&self, user: &User, rng: &mut R, now: DateTime<Utc>) -> Vec<Post> {
        (0..self.config.posts_per_user)
            .map(|i| Post {
                id: Uuid::new_v4(),
                caption: POST_CAPTIONS.choose(rng).unwrap_or(&"").to_string(),
                media_url: format!("https://picsum.photos/400/400?random={}", rng.gen_range(1..=100)),
                likes: rng.gen_range(0..=500),
                comments: rng.gen_range(0..=40),
                timestamp: now - Duration::hours(i as i64 * 6 + rng.gen_range(0..6)),
                author_id: user.id,
                is_liked: false,
            })
            .collect()
    }

    /// Populate an empty store with users, stories and posts.
    ///
    /// Does nothing if any user already exists.
    pub async fn seed_if_empty<S: EntityStore, R: Rng>(
        &self,
        repo: &Repository<S>,
        rng: &mut R,
    ) -> Result<SeedReport, StoreError> {
        if repo.user_count().await? > 0 {
            return Ok(SeedReport::default());
        }

        let now = Utc::now();
        let mut users = Vec::new();
        let mut stories = Vec::new();
        let mut posts = Vec::new();
        for seed in &self.feed.users {
            let mut user = self.user(seed, rng, now);
            let user_posts = self.posts_for(&user, rng, now);
            user.posts = user_posts.len() as u32;
            stories.extend(self.stories_for(&user, rng, now));
            posts.extend(user_posts);
            users.push(user);
        }

        repo.save_users(&users).await?;
        repo.save_stories(&stories).await?;
        repo.save_posts(&posts).await?;

        let report = SeedReport {
            users: users.len(),
            stories: stories.len(),
            posts: posts.len(),
        };
        tracing::info!(?report, "seeded empty store");
        Ok(report)
    }

    /// Insert a fresh batch of stories for every seed author, creating any
    /// author that does not exist yet. Existing stories are left alone; callers
    /// regenerating delete them first.
    pub async fn insert_stories<S: EntityStore, R: Rng>(
        &self,
        repo: &Repository<S>,
        rng: &mut R,
    ) -> Result<SeedReport, StoreError> {
        let now = Utc::now();
        let ids: Vec<Uuid> = self.feed.users.iter().map(Self::user_id).collect();
        let existing = repo.users_by_ids(ids).await?;

        let mut new_users = Vec::new();
        let mut stories = Vec::new();
        for seed in &self.feed.users {
            let user = match existing.iter().find(|u| u.id == Self::user_id(seed)) {
                Some(user) => user.clone(),
                None => {
                    let user = self.user(seed, rng, now);
                    new_users.push(user.clone());
                    user
                }
            };
            stories.extend(self.stories_for(&user, rng, now));
        }

        repo.save_users(&new_users).await?;
        repo.save_stories(&stories).await?;

        Ok(SeedReport {
            users: new_users.len(),
            stories: stories.len(),
            posts: 0,
        })
    }
}
