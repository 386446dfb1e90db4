//! Framework-independent view state for the stories viewer and the post feed.
//!
//! Controllers own their state in [`Observable`] containers. A UI layer reads
//! snapshots, subscribes for changes, and forwards user input and timer ticks;
//! it never mutates state directly.

pub mod error;
pub mod feed;
pub mod observable;
pub mod stories;

#[cfg(test)]
mod testing;

pub use error::ControllerError;
pub use feed::{FeedController, FeedState};
pub use observable::{Observable, SubscriptionId};
pub use stories::{
    Gesture, GestureAction, LifecyclePhase, PageLoad, Playback, PlaybackPhase, StoriesController,
    StoriesFeed, StoriesSettings, StoryIndex, TapZone, TickOutcome, TimerToken, Timing, Transition,
};
