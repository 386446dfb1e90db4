//! # App configuration — `insta.toml`
//!
//! Defines the optional TOML file that lives in the app's data directory
//! (filename: [`InstaConfig::filename`] = `"insta.toml"`). It tunes stories
//! pagination and playback, gesture thresholds, and the demo data generator.
//!
//! ## Structure
//!
//! ```toml
//! [stories]
//! page_size = 20              # stories fetched per page
//! story_duration_ms = 5000    # time each story stays on screen
//! tick_interval_ms = 50       # progress timer period
//! honor_duration_hint = false # use each story's own duration instead
//!
//! [gestures]
//! swipe_threshold = 30.0      # horizontal drag that changes story
//! dismiss_threshold = 100.0   # downward drag that closes the viewer
//!
//! [seed]
//! min_stories_per_user = 5
//! max_stories_per_user = 8
//! posts_per_user = 2
//! story_spacing_minutes = 30
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`InstaConfig`] | Top-level config. Builder helpers, TOML (de)serialisation, [`load`](InstaConfig::load) from a directory. |
//! | [`StoriesConfig`] | Page size and playback timing. |
//! | [`GestureConfig`] | Drag thresholds in points. |
//! | [`SeedConfig`] | Demo data shape. |
//!
//! All structs implement `Default` with the production defaults, and every field
//! is `#[serde(default)]`, so a missing or partial file is equivalent to the
//! default configuration. Zero timings are raised to 1 ms when the stories
//! controller reads them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `insta.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstaConfig {
    #[serde(default)]
    pub stories: StoriesConfig,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Stories pagination and playback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoriesConfig {
    pub page_size: usize,
    pub story_duration_ms: u64,
    pub tick_interval_ms: u64,
    /// Play each story for its own `duration_hint` instead of `story_duration_ms`.
    pub honor_duration_hint: bool,
}

impl Default for StoriesConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            story_duration_ms: 5_000,
            tick_interval_ms: 50,
            honor_duration_hint: false,
        }
    }
}

impl StoriesConfig {
    pub fn story_duration(&self) -> Duration {
        Duration::from_millis(self.story_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Gesture thresholds, in points of drag translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub swipe_threshold: f64,
    pub dismiss_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 30.0,
            dismiss_threshold: 100.0,
        }
    }
}

/// Shape of the generated demo data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub min_stories_per_user: usize,
    pub max_stories_per_user: usize,
    pub posts_per_user: usize,
    pub story_spacing_minutes: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            min_stories_per_user: 5,
            max_stories_per_user: 8,
            posts_per_user: 2,
            story_spacing_minutes: 30,
        }
    }
}

impl InstaConfig {
    /// Builder method to set the stories page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.stories.page_size = page_size;
        self
    }

    /// Builder method to set playback timing.
    pub fn with_timing(mut self, story_duration_ms: u64, tick_interval_ms: u64) -> Self {
        self.stories.story_duration_ms = story_duration_ms;
        self.stories.tick_interval_ms = tick_interval_ms;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "insta.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read `insta.toml` from `dir`, falling back to defaults when the file is
    /// absent or unparseable.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(Self::filename());
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match Self::from_toml(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring invalid config: {e}");
                Self::default()
            }
        }
    }
}
