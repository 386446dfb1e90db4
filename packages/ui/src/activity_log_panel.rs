use dioxus::prelude::*;

use crate::activity_log::{use_activity_log, LogLevel};

fn entry_class(level: &LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "activity-entry error",
        LogLevel::Warning => "activity-entry warning",
        LogLevel::Success => "activity-entry success",
        LogLevel::Info => "activity-entry info",
    }
}

/// Collapsible list of recent activity, newest first.
#[component]
pub fn ActivityLogPanel() -> Element {
    let mut log = use_activity_log();
    let visible = log.read().visible;
    let entries = log.read().entries.clone();

    rsx! {
        if visible {
            div {
                class: "activity-panel",
                div {
                    class: "activity-panel-header",
                    span { "Activity" }
                    button { onclick: move |_| log.write().entries.clear(), "Clear" }
                    button { onclick: move |_| log.write().visible = false, "Close" }
                }
                for entry in entries.iter().rev() {
                    div {
                        class: entry_class(&entry.level),
                        span { class: "activity-time", "{entry.timestamp}" }
                        span { class: "activity-source", {format!(" [{}]", entry.source.label())} }
                        span { " {entry.message}" }
                    }
                }
            }
        }
    }
}

/// Toggle button, highlighted when an error was logged.
#[component]
pub fn ActivityLogToggle() -> Element {
    let mut log = use_activity_log();
    let errors = log.read().error_count();

    rsx! {
        button {
            class: if errors > 0 { "activity-toggle has-errors" } else { "activity-toggle" },
            title: "Activity",
            onclick: move |_| {
                let visible = log.read().visible;
                log.write().visible = !visible;
            },
            if errors > 0 { "{errors} !" } else { "Activity" }
        }
    }
}

/// Dismissable banner for a controller's current error message.
#[component]
pub fn ErrorBanner(message: Option<String>, on_dismiss: EventHandler<()>) -> Element {
    rsx! {
        if let Some(text) = message {
            div {
                class: "error-banner",
                span { "{text}" }
                button { onclick: move |_| on_dismiss.call(()), "Dismiss" }
            }
        }
    }
}
