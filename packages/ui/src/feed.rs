use chrono::Utc;
use controllers::FeedState;
use dioxus::prelude::*;
use store::models::time_ago;
use uuid::Uuid;

use crate::activity_log::{log_activity, use_activity_log, LogLevel, LogSource};
use crate::activity_log_panel::ErrorBanner;
use crate::services::use_services;

#[derive(Clone, PartialEq)]
struct PostRow {
    id: Uuid,
    author: String,
    avatar: String,
    media_url: String,
    caption: String,
    likes: u32,
    comments: u32,
    age: String,
    liked: bool,
}

fn rows(state: &FeedState) -> Vec<PostRow> {
    let now = Utc::now();
    state
        .posts
        .iter()
        .map(|post| {
            let (author, avatar) = state
                .author_of(post)
                .map(|u| (u.username.clone(), u.avatar_url.clone()))
                .unwrap_or_default();
            PostRow {
                id: post.id,
                author,
                avatar,
                media_url: post.media_url.clone(),
                caption: post.caption.clone(),
                likes: post.likes,
                comments: post.comments,
                age: time_ago(post.timestamp, now),
                liked: post.is_liked,
            }
        })
        .collect()
}

/// Post feed, newest first, with like buttons.
#[component]
pub fn FeedList() -> Element {
    let services = use_services();
    let mut log = use_activity_log();
    let state = use_signal(|| services.feed.state());

    let controller = services.feed.clone();
    let id = use_hook(move || {
        controller.subscribe(move |snapshot| {
            let mut state = state;
            state.set(snapshot.clone());
        })
    });
    let controller = services.feed.clone();
    use_drop(move || {
        controller.unsubscribe(id);
    });

    let on_like = {
        let controller = services.feed.clone();
        move |post_id: Uuid| {
            let controller = controller.clone();
            spawn(async move {
                if let Err(e) = controller.toggle_like(post_id).await {
                    log_activity(&mut log, LogSource::Feed, LogLevel::Error, &e.to_string());
                }
            });
        }
    };

    let on_refresh = {
        let controller = services.feed.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            spawn(async move {
                match controller.refresh().await {
                    Ok(n) => log_activity(&mut log, LogSource::Feed, LogLevel::Info, &format!("Loaded {n} posts")),
                    Err(e) => log_activity(&mut log, LogSource::Feed, LogLevel::Error, &e.to_string()),
                }
            });
        }
    };

    let on_dismiss = {
        let controller = services.feed.clone();
        move |_: ()| controller.clear_error()
    };

    let snapshot = state.read();
    let posts = rows(&snapshot);
    let error = snapshot.error_message.clone();
    let is_loading = snapshot.is_loading;
    drop(snapshot);

    rsx! {
        ErrorBanner { message: error, on_dismiss: on_dismiss }
        div {
            class: "feed",
            button { class: "feed-refresh", disabled: is_loading, onclick: on_refresh, "Refresh" }
            if posts.is_empty() && !is_loading {
                p { class: "feed-empty", "No posts yet" }
            }
            for row in posts {
                article {
                    key: "{row.id}",
                    class: "post-card",
                    header {
                        img { class: "post-avatar", src: "{row.avatar}", alt: "{row.author}" }
                        span { class: "post-author", "{row.author}" }
                        span { class: "post-age", "{row.age}" }
                    }
                    img { class: "post-media", src: "{row.media_url}" }
                    div {
                        class: "post-actions",
                        button {
                            class: if row.liked { "post-like liked" } else { "post-like" },
                            onclick: {
                                let on_like = on_like.clone();
                                let post_id = row.id;
                                move |_: MouseEvent| on_like(post_id)
                            },
                            if row.liked { "♥" } else { "♡" }
                        }
                        span { "{row.likes} likes · {row.comments} comments" }
                    }
                    p { class: "post-caption", "{row.caption}" }
                }
            }
        }
    }
}
