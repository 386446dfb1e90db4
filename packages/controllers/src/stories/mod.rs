//! # Stories pagination and playback
//!
//! [`StoriesController`] owns two observable containers:
//!
//! | Container | Snapshot | Changes on |
//! |-----------|----------|-----------|
//! | feed | [`StoriesFeed`] | page loads, refresh, regeneration, viewed/liked writes |
//! | playback | [`Playback`] | selection, timer ticks, navigation, lifecycle, likes |
//!
//! Keeping them apart means a 50 ms progress tick only clones the active author's
//! handful of stories, never the whole loaded sequence.
//!
//! ## Pagination
//!
//! Pages are fetched newest first. A load that starts while another is in flight
//! is skipped (not queued). `offset == 0` replaces the sequence, anything else
//! appends. `has_more` is `true` exactly when the last page came back full.
//!
//! Every load remembers the load epoch it started in. Regeneration bumps the
//! epoch, so a page that was fetched before the old stories were deleted is
//! dropped when it lands instead of being merged into the new sequence.
//!
//! ## Concurrency
//!
//! All methods take `&self` and run on the UI thread. No `RefCell` borrow is held
//! across an `.await`, so several UI futures may interleave on one executor.
//!
//! ## Errors
//!
//! Every store failure is caught here: the message lands in
//! [`StoriesFeed::error_message`] and the method returns the
//! [`ControllerError`]. State is left as it was before the failed call, except
//! for viewed flags, which are never rolled back.

mod gesture;
mod index;
mod playback;

pub use gesture::{Gesture, GestureAction, TapZone};
pub use index::StoryIndex;
pub use playback::{
    LifecyclePhase, Playback, PlaybackPhase, TickOutcome, TimerToken, Timing, Transition,
};

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::Rng;
use store::config::GestureConfig;
use store::{EntityStore, InstaConfig, Repository, Seeder, Story, User};
use uuid::Uuid;

use crate::error::ControllerError;
use crate::observable::{Observable, SubscriptionId};

/// Outcome of a page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageLoad {
    /// Another load was in flight, there is nothing more to load, or a
    /// regeneration replaced the stories while the page was being fetched.
    Skipped,
    /// The page arrived with this many stories.
    Loaded(usize),
}

/// Loaded stories and pagination status.
#[derive(Clone, Debug, PartialEq)]
pub struct StoriesFeed {
    pub stories: Vec<Story>,
    pub authors: HashMap<Uuid, User>,
    pub index: StoryIndex,
    pub is_loading: bool,
    pub has_more: bool,
    pub error_message: Option<String>,
}

impl Default for StoriesFeed {
    fn default() -> Self {
        Self {
            stories: Vec::new(),
            authors: HashMap::new(),
            index: StoryIndex::default(),
            is_loading: false,
            has_more: true,
            error_message: None,
        }
    }
}

impl StoriesFeed {
    pub fn story(&self, id: Uuid) -> Option<&Story> {
        self.index.position(id).and_then(|i| self.stories.get(i))
    }

    pub fn author_of(&self, story: &Story) -> Option<&User> {
        self.authors.get(&story.author_id)
    }

    /// First story of every author, in playback order. Drives the story strip.
    pub fn author_heads(&self) -> Vec<&Story> {
        self.index
            .authors()
            .iter()
            .filter_map(|a| self.index.stories_of(*a).first())
            .filter_map(|&i| self.stories.get(i))
            .collect()
    }

    fn story_mut(&mut self, id: Uuid) -> Option<&mut Story> {
        let i = self.index.position(id)?;
        self.stories.get_mut(i)
    }
}

/// Tunables for [`StoriesController`].
#[derive(Clone, Debug, PartialEq)]
pub struct StoriesSettings {
    pub page_size: usize,
    pub timing: Timing,
    pub gestures: GestureConfig,
}

impl Default for StoriesSettings {
    fn default() -> Self {
        Self::from(&InstaConfig::default())
    }
}

impl From<&InstaConfig> for StoriesSettings {
    fn from(config: &InstaConfig) -> Self {
        Self {
            page_size: config.stories.page_size.max(1),
            // both at least 1 ms
            timing: Timing {
                story_duration: config.stories.story_duration().max(Duration::from_millis(1)),
                tick_interval: config.stories.tick_interval().max(Duration::from_millis(1)),
                honor_duration_hint: config.stories.honor_duration_hint,
            },
            gestures: config.gestures.clone(),
        }
    }
}

/// Paginates stories from the store and drives the story viewer.
pub struct StoriesController<S: EntityStore> {
    repo: Repository<S>,
    settings: StoriesSettings,
    feed: Observable<StoriesFeed>,
    playback: Observable<Playback>,
    load_epoch: Cell<u64>,
}

impl<S: EntityStore> StoriesController<S> {
    pub fn new(repo: Repository<S>, settings: StoriesSettings) -> Self {
        let playback = Playback::new(settings.timing);
        Self {
            repo,
            settings,
            feed: Observable::new(StoriesFeed::default()),
            playback: Observable::new(playback),
            load_epoch: Cell::new(0),
        }
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn settings(&self) -> &StoriesSettings {
        &self.settings
    }

    pub fn feed(&self) -> StoriesFeed {
        self.feed.snapshot()
    }

    pub fn playback(&self) -> Playback {
        self.playback.snapshot()
    }

    pub fn subscribe_feed(&self, f: impl Fn(&StoriesFeed) + 'static) -> SubscriptionId {
        self.feed.subscribe(f)
    }

    pub fn unsubscribe_feed(&self, id: SubscriptionId) -> bool {
        self.feed.unsubscribe(id)
    }

    pub fn subscribe_playback(&self, f: impl Fn(&Playback) + 'static) -> SubscriptionId {
        self.playback.subscribe(f)
    }

    pub fn unsubscribe_playback(&self, id: SubscriptionId) -> bool {
        self.playback.unsubscribe(id)
    }

    pub fn clear_error(&self) {
        self.feed.update(|feed| feed.error_message = None);
    }

    // ── Pagination ─────────────────────────────────────────────────────

    /// Load `limit` stories starting at `offset`.
    pub async fn load_page(&self, offset: usize, limit: usize) -> Result<PageLoad, ControllerError> {
        self.ensure_ready()?;

        let started = self.feed.update(|feed| {
            if feed.is_loading {
                return false;
            }
            feed.is_loading = true;
            feed.error_message = None;
            true
        });
        if !started {
            tracing::debug!(offset, "stories load already in flight, skipping");
            return Ok(PageLoad::Skipped);
        }

        self.complete_load(offset, limit, self.load_epoch.get()).await
    }

    /// Fetch a page for a load that already set `is_loading`, and apply it
    /// unless a regeneration started since `epoch`.
    async fn complete_load(
        &self,
        offset: usize,
        limit: usize,
        epoch: u64,
    ) -> Result<PageLoad, ControllerError> {
        let fetched = self.fetch_page(offset, limit).await;
        if self.load_epoch.get() != epoch {
            // the newer load owns `is_loading` now
            tracing::debug!(offset, epoch, "stories page superseded, dropping it");
            return Ok(PageLoad::Skipped);
        }

        match fetched {
            Ok((page, authors)) => {
                let count = page.len();
                self.feed.mutate(|feed| {
                    if offset == 0 {
                        feed.stories = page;
                        feed.authors.clear();
                    } else {
                        feed.stories.extend(page);
                    }
                    feed.authors.extend(authors.into_iter().map(|u| (u.id, u)));
                    feed.index = StoryIndex::build(&feed.stories);
                    feed.has_more = limit > 0 && count == limit;
                    feed.is_loading = false;
                });
                self.feed.notify();
                self.rebase_playback();
                tracing::debug!(offset, count, "loaded stories page");
                Ok(PageLoad::Loaded(count))
            }
            Err(e) => {
                self.feed.update(|feed| feed.is_loading = false);
                Err(self.surface(e))
            }
        }
    }

    /// Append the next page, unless loading or exhausted.
    pub async fn load_next(&self) -> Result<PageLoad, ControllerError> {
        let (busy, has_more, offset) = self
            .feed
            .read(|feed| (feed.is_loading, feed.has_more, feed.stories.len()));
        if busy || !has_more {
            return Ok(PageLoad::Skipped);
        }
        self.load_page(offset, self.settings.page_size).await
    }

    /// Reload from the first page, replacing the loaded sequence.
    pub async fn refresh(&self) -> Result<PageLoad, ControllerError> {
        self.load_page(0, self.settings.page_size).await
    }

    /// Delete every story, reseed from the seed feed, then reload the first page.
    ///
    /// A failed delete skips the reseed (old and new stories never mix) but the
    /// reload still happens; the failure is surfaced after it. Pages in flight
    /// when this starts are dropped, and no other load starts until the reload
    /// has landed.
    pub async fn regenerate_all<R: Rng>(
        &self,
        seeder: &Seeder,
        rng: &mut R,
    ) -> Result<PageLoad, ControllerError> {
        self.ensure_ready()?;
        self.close();

        let epoch = self.load_epoch.get().wrapping_add(1);
        self.load_epoch.set(epoch);
        self.feed.update(|feed| {
            feed.is_loading = true;
            feed.error_message = None;
        });

        let seeding = match self.repo.delete_all_stories().await {
            Ok(removed) => {
                tracing::debug!(removed, "cleared stories");
                match seeder.insert_stories(&self.repo, rng).await {
                    Ok(report) => {
                        tracing::info!(stories = report.stories, users = report.users, "regenerated stories");
                        Ok(())
                    }
                    Err(e) => {
                        tracing::warn!("failed to insert stories: {e}");
                        Err(ControllerError::WriteFailure(e))
                    }
                }
            }
            Err(e) => {
                tracing::warn!("failed to clear existing stories: {e}");
                Err(ControllerError::WriteFailure(e))
            }
        };

        let loaded = self.complete_load(0, self.settings.page_size, epoch).await;
        match (seeding, loaded) {
            (Err(e), _) => Err(self.surface(e)),
            (Ok(()), Ok(PageLoad::Skipped)) => {
                tracing::warn!(epoch, "regenerated stories were not reloaded");
                Err(ControllerError::ReloadSuperseded)
            }
            (Ok(()), loaded) => loaded,
        }
    }

    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Story>, Vec<User>), ControllerError> {
        let page = self
            .repo
            .stories_page(offset, limit)
            .await
            .map_err(ControllerError::ReadFailure)?;

        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = page
            .iter()
            .map(|s| s.author_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let authors = self
            .repo
            .users_by_ids(ids)
            .await
            .map_err(ControllerError::ReadFailure)?;

        Ok((page, authors))
    }

    // ── Playback ───────────────────────────────────────────────────────

    /// Open the viewer on `story_id` and mark that story viewed.
    pub async fn select(&self, story_id: Uuid) -> Result<(), ControllerError> {
        self.ensure_ready()?;

        if !self.drive(|playback, feed| playback.begin(story_id, &feed.stories, &feed.index)) {
            return Err(self.surface(ControllerError::UnknownStory(story_id)));
        }
        tracing::debug!(%story_id, "playback started");

        let Some(mut story) = self.feed.read(|feed| feed.story(story_id).cloned()) else {
            return Ok(());
        };
        if story.is_viewed {
            return Ok(());
        }
        story.is_viewed = true;
        self.feed.update(|feed| {
            if let Some(s) = feed.story_mut(story_id) {
                s.is_viewed = true;
            }
        });
        self.playback.update(|playback| playback.set_viewed(story_id));

        self.repo
            .save_story(&story)
            .await
            .map_err(|e| self.surface(ControllerError::WriteFailure(e)))
    }

    /// Advance the progress timer. Hosts call this every tick interval with the
    /// token they were started for, and stop on [`TickOutcome::Stale`].
    pub fn tick(&self, token: TimerToken) -> TickOutcome {
        if self.playback.read(|p| p.timer() != Some(token)) {
            return TickOutcome::Stale;
        }
        let outcome = self.drive(|playback, feed| playback.tick(token, &feed.stories, &feed.index));
        if let TickOutcome::Advanced(transition) = outcome {
            tracing::debug!(?transition, "story finished");
        }
        outcome
    }

    pub fn advance_forward(&self) -> Transition {
        self.drive(|playback, feed| playback.forward(&feed.stories, &feed.index))
    }

    pub fn advance_backward(&self) -> Transition {
        self.drive(|playback, feed| playback.backward(&feed.stories, &feed.index))
    }

    pub fn tap(&self, zone: TapZone) -> Transition {
        match zone {
            TapZone::Backward => self.advance_backward(),
            TapZone::Forward => self.advance_forward(),
        }
    }

    pub fn gesture(&self, gesture: Gesture) -> Transition {
        match gesture.classify(&self.settings.gestures) {
            GestureAction::Forward => self.advance_forward(),
            GestureAction::Backward => self.advance_backward(),
            GestureAction::Dismiss => self.close(),
            GestureAction::None => Transition::Ignored,
        }
    }

    /// Dismiss the viewer from any active phase.
    pub fn close(&self) -> Transition {
        self.playback.update(|playback| playback.dismiss())
    }

    /// Pause on background, resume on foreground. Returns whether the phase changed.
    pub fn set_lifecycle(&self, phase: LifecyclePhase) -> bool {
        self.playback.update(|playback| match phase {
            LifecyclePhase::Active => playback.resume(),
            LifecyclePhase::Inactive | LifecyclePhase::Background => playback.pause(),
        })
    }

    /// Flip the liked flag of a loaded story.
    ///
    /// The viewer shows the new value at once; the loaded sequence only changes
    /// once the write succeeds. Returns the new flag.
    pub async fn toggle_like(&self, story_id: Uuid) -> Result<bool, ControllerError> {
        self.ensure_ready()?;

        let Some(mut story) = self.feed.read(|feed| feed.story(story_id).cloned()) else {
            return Err(self.surface(ControllerError::UnknownStory(story_id)));
        };
        let liked = !story.is_liked;
        story.is_liked = liked;
        self.playback.update(|playback| playback.set_liked(story_id, liked));

        match self.repo.save_story(&story).await {
            Ok(()) => {
                self.feed.update(|feed| {
                    if let Some(s) = feed.story_mut(story_id) {
                        s.is_liked = liked;
                    }
                });
                Ok(liked)
            }
            Err(e) => {
                self.playback.update(|playback| playback.set_liked(story_id, !liked));
                Err(self.surface(ControllerError::WriteFailure(e)))
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Run a playback transition against the current feed, then notify.
    fn drive<R>(&self, f: impl FnOnce(&mut Playback, &StoriesFeed) -> R) -> R {
        let result = {
            let feed = self.feed.borrow();
            self.playback.mutate(|playback| f(playback, &feed))
        };
        self.playback.notify();
        result
    }

    fn rebase_playback(&self) {
        if self.playback.read(|p| p.is_active()) {
            self.drive(|playback, feed| playback.rebase(&feed.stories, &feed.index));
        }
    }

    fn ensure_ready(&self) -> Result<(), ControllerError> {
        if self.repo.is_ready() {
            Ok(())
        } else {
            Err(self.surface(ControllerError::StoreUnavailable))
        }
    }

    fn surface(&self, error: ControllerError) -> ControllerError {
        tracing::warn!("stories: {error}");
        let message = error.to_string();
        self.feed.update(|feed| feed.error_message = Some(message));
        error
    }
}

#[cfg(test)]
mod tests;
