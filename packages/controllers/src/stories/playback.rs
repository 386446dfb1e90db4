//! Story viewer state machine.
//!
//! ```text
//!            select                 close / swipe down / ran out of authors
//!   Idle ───────────► Playing ─────────────────────────────────► Dismissed
//!                      │   ▲                                         │
//!          background  │   │ foreground                    select    │
//!                      ▼   │                                         │
//!                     Paused ───── close ──► Dismissed      Playing ◄┘
//! ```
//!
//! The timer is a [`TimerToken`]: every (re)start issues a fresh token and every
//! cancel clears it. A tick carrying anything but the current token is stale and
//! changes nothing, so a host loop that outlives its token can never mutate a
//! newer sub-state.

use std::time::Duration;

use store::Story;
use uuid::Uuid;

use super::index::StoryIndex;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Playing,
    /// App backgrounded; progress is kept, no timer runs.
    Paused,
    Dismissed,
}

/// App lifecycle signal from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Active,
    Inactive,
    Background,
}

impl LifecyclePhase {
    /// A window that loses focus goes inactive; regaining it resumes.
    pub fn from_focus(focused: bool) -> Self {
        if focused {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

/// Identifies one run of the repeating progress timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Result of a navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Moved within the current author's stories.
    Moved,
    /// Moved to another author's stories.
    SwitchedAuthor,
    Dismissed,
    /// Nothing to do in the current phase.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Progressed,
    Advanced(Transition),
    /// Token no longer current; the host should stop its loop.
    Stale,
}

/// Playback timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub story_duration: Duration,
    pub tick_interval: Duration,
    pub honor_duration_hint: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            story_duration: Duration::from_secs(5),
            tick_interval: Duration::from_millis(50),
            honor_duration_hint: false,
        }
    }
}

/// Snapshot of the story viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct Playback {
    phase: PlaybackPhase,
    author: Option<Uuid>,
    stories: Vec<Story>,
    index: usize,
    anchor: usize,
    elapsed: Duration,
    timing: Timing,
    timer: Option<TimerToken>,
    generation: u64,
}

impl Playback {
    pub fn new(timing: Timing) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            author: None,
            stories: Vec::new(),
            index: 0,
            anchor: 0,
            elapsed: Duration::ZERO,
            timing,
            timer: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Playing or paused.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, PlaybackPhase::Playing | PlaybackPhase::Paused)
    }

    pub fn author(&self) -> Option<Uuid> {
        self.author
    }

    /// The current author's stories.
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Position of the current story in [`stories`](Self::stories).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Global index of the current author's first story.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn current(&self) -> Option<&Story> {
        self.stories.get(self.index)
    }

    pub fn timer(&self) -> Option<TimerToken> {
        self.timer
    }

    pub fn tick_interval(&self) -> Duration {
        self.timing.tick_interval
    }

    /// How long the current story stays on screen.
    pub fn story_duration(&self) -> Duration {
        match self.current() {
            Some(story) if self.timing.honor_duration_hint && story.duration_hint > 0.0 => {
                Duration::from_secs_f64(story.duration_hint)
            }
            _ => self.timing.story_duration,
        }
    }

    /// Progress of the current story in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let total = self.story_duration().as_secs_f64();
        if total <= 0.0 {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    /// Fill of the progress bar for story `i` of the current author.
    pub fn bar_progress(&self, i: usize) -> f64 {
        if i < self.index {
            1.0
        } else if i == self.index {
            self.progress()
        } else {
            0.0
        }
    }

    pub fn bars(&self) -> Vec<f64> {
        (0..self.stories.len()).map(|i| self.bar_progress(i)).collect()
    }

    /// Start playing at `story_id`. Returns `false` if it is not loaded.
    pub(crate) fn begin(&mut self, story_id: Uuid, stories: &[Story], index: &StoryIndex) -> bool {
        let Some(position) = index.position(story_id) else {
            return false;
        };
        let author = stories[position].author_id;
        let indices = index.stories_of(author);
        let Some(at) = indices.iter().position(|&i| i == position) else {
            return false;
        };
        self.load_author(author, at, stories, index);
        self.phase = PlaybackPhase::Playing;
        self.restart_timer();
        true
    }

    pub(crate) fn tick(&mut self, token: TimerToken, stories: &[Story], index: &StoryIndex) -> TickOutcome {
        if self.timer != Some(token) || self.phase != PlaybackPhase::Playing {
            return TickOutcome::Stale;
        }
        self.elapsed += self.timing.tick_interval;
        if self.progress() >= 1.0 {
            TickOutcome::Advanced(self.forward(stories, index))
        } else {
            TickOutcome::Progressed
        }
    }

    pub(crate) fn forward(&mut self, stories: &[Story], index: &StoryIndex) -> Transition {
        if self.phase != PlaybackPhase::Playing {
            return Transition::Ignored;
        }
        if self.index + 1 < self.stories.len() {
            self.index += 1;
            self.elapsed = Duration::ZERO;
            self.restart_timer();
            return Transition::Moved;
        }
        match self.author.and_then(|a| index.next_author(a)) {
            Some(next) => {
                self.load_author(next, 0, stories, index);
                self.restart_timer();
                Transition::SwitchedAuthor
            }
            None => self.dismiss(),
        }
    }

    pub(crate) fn backward(&mut self, stories: &[Story], index: &StoryIndex) -> Transition {
        if self.phase != PlaybackPhase::Playing {
            return Transition::Ignored;
        }
        if self.index > 0 {
            self.index -= 1;
            self.elapsed = Duration::ZERO;
            self.restart_timer();
            return Transition::Moved;
        }
        match self.author.and_then(|a| index.previous_author(a)) {
            Some(previous) => {
                let last = index.stories_of(previous).len().saturating_sub(1);
                self.load_author(previous, last, stories, index);
                self.restart_timer();
                Transition::SwitchedAuthor
            }
            None => self.dismiss(),
        }
    }

    pub(crate) fn dismiss(&mut self) -> Transition {
        if !self.is_active() {
            return Transition::Ignored;
        }
        self.timer = None;
        self.phase = PlaybackPhase::Dismissed;
        Transition::Dismissed
    }

    /// Stop the timer, keeping progress.
    pub(crate) fn pause(&mut self) -> bool {
        if self.phase != PlaybackPhase::Playing {
            return false;
        }
        self.timer = None;
        self.phase = PlaybackPhase::Paused;
        true
    }

    /// Restart the timer from the current progress.
    pub(crate) fn resume(&mut self) -> bool {
        if self.phase != PlaybackPhase::Paused {
            return false;
        }
        self.phase = PlaybackPhase::Playing;
        self.restart_timer();
        true
    }

    /// Re-resolve the current author after the loaded sequence changed.
    ///
    /// Keeps the current story, progress and timer when that story is still
    /// loaded; dismisses otherwise.
    pub(crate) fn rebase(&mut self, stories: &[Story], index: &StoryIndex) {
        if !self.is_active() {
            return;
        }
        let Some(current) = self.current().map(|s| s.id) else {
            self.dismiss();
            return;
        };
        let Some(position) = index.position(current) else {
            self.dismiss();
            return;
        };
        let author = stories[position].author_id;
        let at = index
            .stories_of(author)
            .iter()
            .position(|&i| i == position)
            .unwrap_or(0);
        let elapsed = self.elapsed;
        self.load_author(author, at, stories, index);
        self.elapsed = elapsed;
    }

    pub(crate) fn set_liked(&mut self, story_id: Uuid, liked: bool) -> bool {
        match self.stories.iter_mut().find(|s| s.id == story_id) {
            Some(story) => {
                story.is_liked = liked;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_viewed(&mut self, story_id: Uuid) {
        if let Some(story) = self.stories.iter_mut().find(|s| s.id == story_id) {
            story.is_viewed = true;
        }
    }

    fn load_author(&mut self, author: Uuid, at: usize, stories: &[Story], index: &StoryIndex) {
        let indices = index.stories_of(author);
        self.stories = indices.iter().map(|&i| stories[i].clone()).collect();
        self.index = at.min(self.stories.len().saturating_sub(1));
        self.anchor = indices.first().copied().unwrap_or(0);
        self.author = Some(author);
        self.elapsed = Duration::ZERO;
    }

    fn restart_timer(&mut self) {
        self.generation += 1;
        self.timer = Some(TimerToken(self.generation));
    }
}
