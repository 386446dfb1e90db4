use chrono::Utc;
use controllers::{Gesture, GestureAction, LifecyclePhase, TapZone};
use dioxus::prelude::*;
use store::models::time_ago;

use crate::activity_log::{log_activity, use_activity_log, LogLevel, LogSource};
use crate::services::use_services;
use crate::stories::{use_app_lifecycle, use_playback, use_story_timer, use_stories_feed};

/// Full-screen story player. Renders nothing unless playback is active.
#[component]
pub fn StoryViewer() -> Element {
    let services = use_services();
    let playback = use_playback();
    let feed = use_stories_feed();
    let mut log = use_activity_log();
    use_story_timer(playback);
    use_app_lifecycle();

    // drag start in client coordinates, and whether the last drag was a swipe
    let mut drag_start = use_signal(|| Option::<(f64, f64)>::None);
    let mut swallow_click = use_signal(|| false);
    let mut tap_width = use_signal(|| 0.0_f64);

    let state = playback.read();
    if !state.is_active() {
        return rsx! {};
    }
    let Some(story) = state.current().cloned() else {
        return rsx! {};
    };
    let widths: Vec<String> = state
        .bars()
        .into_iter()
        .map(|fill| format!("width: {:.1}%", fill * 100.0))
        .collect();
    drop(state);

    let author = feed.read().author_of(&story).cloned();
    let (username, avatar) = author
        .map(|u| (u.username, u.avatar_url))
        .unwrap_or_default();
    let age = time_ago(story.timestamp, Utc::now());
    let story_id = story.id;
    let media_url = story.media_url.clone();
    let caption = story.content.clone();
    let liked = story.is_liked;

    let stories = services.stories.clone();
    let on_press = move |evt: PointerEvent| {
        let point = evt.client_coordinates();
        drag_start.set(Some((point.x, point.y)));
        stories.set_lifecycle(LifecyclePhase::Inactive);
    };

    let stories = services.stories.clone();
    let on_release = move |evt: PointerEvent| {
        stories.set_lifecycle(LifecyclePhase::Active);
        let Some((x, y)) = drag_start() else {
            return;
        };
        drag_start.set(None);
        let point = evt.client_coordinates();
        let gesture = Gesture::new(point.x - x, point.y - y);
        if gesture.classify(&stories.settings().gestures) != GestureAction::None {
            swallow_click.set(true);
            stories.gesture(gesture);
        }
    };

    // a press that ends outside the viewer is neither a tap nor a swipe
    let stories = services.stories.clone();
    let on_abandon = move |_: PointerEvent| {
        if drag_start().is_some() {
            drag_start.set(None);
            stories.set_lifecycle(LifecyclePhase::Active);
        }
    };

    let stories = services.stories.clone();
    let on_tap = move |evt: MouseEvent| {
        if swallow_click() {
            swallow_click.set(false);
            return;
        }
        let x = evt.element_coordinates().x;
        stories.tap(TapZone::from_position(x, tap_width()));
    };

    let stories = services.stories.clone();
    let on_like = move |_: MouseEvent| {
        let stories = stories.clone();
        spawn(async move {
            if let Err(e) = stories.toggle_like(story_id).await {
                log_activity(&mut log, LogSource::Stories, LogLevel::Error, &e.to_string());
            }
        });
    };

    let stories = services.stories.clone();
    let on_close = move |_: MouseEvent| {
        stories.close();
    };

    rsx! {
        div {
            class: "story-viewer",
            onpointerdown: on_press,
            onpointerup: on_release,
            onpointercancel: on_abandon.clone(),
            onpointerleave: on_abandon,

            div {
                class: "story-progress",
                for (i, width) in widths.into_iter().enumerate() {
                    div {
                        key: "{i}",
                        class: "story-progress-track",
                        div { class: "story-progress-fill", style: "{width}" }
                    }
                }
            }

            div {
                class: "story-header",
                img { class: "story-header-avatar", src: "{avatar}", alt: "{username}" }
                span { class: "story-header-name", "{username}" }
                span { class: "story-header-age", "{age}" }
                button { class: "story-close", onclick: on_close, "✕" }
            }

            img { class: "story-media", src: "{media_url}" }
            if let Some(text) = caption {
                p { class: "story-caption", "{text}" }
            }

            div {
                class: "story-tap-layer",
                onresize: move |evt: ResizeEvent| {
                    if let Ok(size) = evt.get_content_box_size() {
                        tap_width.set(size.width);
                    }
                },
                onclick: on_tap,
            }

            button {
                class: if liked { "story-like liked" } else { "story-like" },
                onclick: on_like,
                if liked { "♥" } else { "♡" }
            }
        }
    }
}
