//! This crate contains all shared UI for the workspace.

mod repo;
pub use repo::{data_dir, load_config, make_repo, AppStore};

mod services;
pub use services::{use_bootstrap, use_services, AppServices};

pub mod activity_log;
pub use activity_log::{log_activity, use_activity_log, ActivityLog, LogLevel, LogSource};

mod activity_log_panel;
pub use activity_log_panel::{ActivityLogPanel, ActivityLogToggle, ErrorBanner};

mod stories;
pub use stories::{use_app_lifecycle, use_playback, use_stories_feed, use_story_timer};

mod stories_strip;
pub use stories_strip::StoriesStrip;

mod story_viewer;
pub use story_viewer::StoryViewer;

mod feed;
pub use feed::FeedList;
