use dioxus::prelude::*;
use ui::{ActivityLogPanel, ActivityLogToggle, FeedList, StoriesStrip, StoryViewer};

use crate::Route;

#[component]
pub fn AppLayout() -> Element {
    rsx! {
        div {
            class: "navbar",
            Link { to: Route::Home {}, "Home" }
            Link { to: Route::Stories {}, "Stories" }
            ActivityLogToggle {}
        }
        main {
            class: "content",
            Outlet::<Route> {}
        }
        StoryViewer {}
        ActivityLogPanel {}
    }
}

#[component]
pub fn Home() -> Element {
    rsx! {
        StoriesStrip {}
        FeedList {}
    }
}

/// Stories only, for browsing past the first page.
#[component]
pub fn Stories() -> Element {
    rsx! {
        h2 { class: "section-title", "Stories" }
        StoriesStrip {}
    }
}
