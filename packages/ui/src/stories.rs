//! Hooks bridging [`controllers::StoriesController`] into Dioxus signals.

#[cfg(any(feature = "desktop", feature = "mobile"))]
use controllers::LifecyclePhase;
use controllers::{Playback, StoriesFeed, TickOutcome};
use dioxus::prelude::*;

use crate::services::use_services;

/// Signal mirroring the controller's loaded stories. Unsubscribes on drop.
pub fn use_stories_feed() -> Signal<StoriesFeed> {
    let services = use_services();
    let feed = use_signal(|| services.stories.feed());

    let stories = services.stories.clone();
    let id = use_hook(move || {
        stories.subscribe_feed(move |snapshot| {
            let mut feed = feed;
            feed.set(snapshot.clone());
        })
    });
    use_drop(move || {
        services.stories.unsubscribe_feed(id);
    });

    feed
}

/// Signal mirroring the story viewer state. Unsubscribes on drop.
pub fn use_playback() -> Signal<Playback> {
    let services = use_services();
    let playback = use_signal(|| services.stories.playback());

    let stories = services.stories.clone();
    let id = use_hook(move || {
        stories.subscribe_playback(move |snapshot| {
            let mut playback = playback;
            playback.set(snapshot.clone());
        })
    });
    use_drop(move || {
        services.stories.unsubscribe_playback(id);
    });

    playback
}

/// Drive the progress timer while playback holds a timer token.
///
/// Every new token spawns a sleep loop; a loop stops on its first stale tick,
/// so at most one loop makes progress at a time.
pub fn use_story_timer(playback: Signal<Playback>) {
    let services = use_services();
    let token = use_memo(move || playback.read().timer());

    use_effect(move || {
        let Some(token) = token() else {
            return;
        };
        let stories = services.stories.clone();
        let interval = playback.peek().tick_interval();
        spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if stories.tick(token) == TickOutcome::Stale {
                    break;
                }
            }
        });
    });
}

/// Pause playback while the window is unfocused or the app is suspended.
///
/// Only native renderers deliver these events; without the `desktop` or
/// `mobile` feature this does nothing.
pub fn use_app_lifecycle() {
    #[cfg(any(feature = "desktop", feature = "mobile"))]
    {
        #[cfg(feature = "desktop")]
        use dioxus::desktop::{
            tao::event::{Event, WindowEvent},
            use_wry_event_handler,
        };
        #[cfg(all(feature = "mobile", not(feature = "desktop")))]
        use dioxus::mobile::{
            tao::event::{Event, WindowEvent},
            use_wry_event_handler,
        };

        let services = use_services();
        use_wry_event_handler(move |event, _| {
            let phase = match event {
                Event::WindowEvent {
                    event: WindowEvent::Focused(focused),
                    ..
                } => LifecyclePhase::from_focus(*focused),
                Event::Suspended => LifecyclePhase::Background,
                Event::Resumed => LifecyclePhase::Active,
                _ => return,
            };
            if services.stories.set_lifecycle(phase) {
                tracing::debug!(?phase, "playback lifecycle changed");
            }
        });
    }
}
