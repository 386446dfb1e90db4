use controllers::{ControllerError, PageLoad};
use dioxus::prelude::*;
use uuid::Uuid;

use crate::activity_log::{log_activity, use_activity_log, LogLevel, LogSource};
use crate::activity_log_panel::ErrorBanner;
use crate::services::use_services;
use crate::stories::use_stories_feed;

/// Horizontal row with one avatar per author, plus paging controls.
#[component]
pub fn StoriesStrip() -> Element {
    let services = use_services();
    let feed = use_stories_feed();
    let mut log = use_activity_log();

    let report = move |action: &str, result: Result<PageLoad, ControllerError>| match result {
        Ok(PageLoad::Loaded(n)) => {
            log_activity(&mut log, LogSource::Stories, LogLevel::Info, &format!("{action}: {n} stories"))
        }
        Ok(PageLoad::Skipped) => {}
        Err(e) => log_activity(&mut log, LogSource::Stories, LogLevel::Error, &format!("{action}: {e}")),
    };

    let on_select = {
        let stories = services.stories.clone();
        move |story_id: Uuid| {
            let stories = stories.clone();
            spawn(async move {
                if let Err(e) = stories.select(story_id).await {
                    log_activity(&mut log, LogSource::Stories, LogLevel::Warning, &e.to_string());
                }
            });
        }
    };

    let on_more = {
        let stories = services.stories.clone();
        move |_: MouseEvent| {
            let stories = stories.clone();
            spawn(async move {
                let mut report = report;
                report("Load more", stories.load_next().await);
            });
        }
    };

    let on_refresh = {
        let stories = services.stories.clone();
        move |_: MouseEvent| {
            let stories = stories.clone();
            spawn(async move {
                let mut report = report;
                report("Refresh", stories.refresh().await);
            });
        }
    };

    let on_regenerate = {
        let services = services.clone();
        move |_: MouseEvent| {
            let services = services.clone();
            spawn(async move {
                let mut rng = rand::thread_rng();
                let result = services.stories.regenerate_all(&services.seeder, &mut rng).await;
                let mut report = report;
                report("Regenerate", result);
            });
        }
    };

    let on_dismiss = {
        let stories = services.stories.clone();
        move |_: ()| stories.clear_error()
    };

    let snapshot = feed.read();
    let heads: Vec<(Uuid, String, String, bool)> = snapshot
        .author_heads()
        .into_iter()
        .map(|story| {
            let (name, avatar) = snapshot
                .author_of(story)
                .map(|u| (u.username.clone(), u.avatar_url.clone()))
                .unwrap_or_default();
            let all_viewed = snapshot
                .index
                .stories_of(story.author_id)
                .iter()
                .filter_map(|&i| snapshot.stories.get(i))
                .all(|s| s.is_viewed);
            (story.id, name, avatar, all_viewed)
        })
        .collect();
    let is_loading = snapshot.is_loading;
    let has_more = snapshot.has_more;
    let error = snapshot.error_message.clone();
    drop(snapshot);

    rsx! {
        ErrorBanner { message: error, on_dismiss: on_dismiss }
        div {
            class: "stories-strip",
            for (story_id, name, avatar, all_viewed) in heads {
                button {
                    key: "{story_id}",
                    class: if all_viewed { "story-avatar viewed" } else { "story-avatar" },
                    onclick: {
                        let on_select = on_select.clone();
                        move |_: MouseEvent| on_select(story_id)
                    },
                    img { src: "{avatar}", alt: "{name}" }
                    span { "{name}" }
                }
            }
            if has_more {
                button {
                    class: "stories-more",
                    disabled: is_loading,
                    onclick: on_more,
                    if is_loading { "Loading…" } else { "More" }
                }
            }
        }
        div {
            class: "stories-actions",
            button { disabled: is_loading, onclick: on_refresh, "Refresh" }
            button { disabled: is_loading, onclick: on_regenerate, "Regenerate stories" }
        }
    }
}
