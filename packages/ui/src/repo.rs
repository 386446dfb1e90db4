//! Shared store constructor for all platforms.
//!
//! Returns a [`store::Repository`] backed by [`store::FileStore`] rooted at
//! `<data_dir>/insta/`, next to the optional `insta.toml`.

use std::path::PathBuf;

use store::{FileStore, InstaConfig, Repository, StoreError};

/// Store backend used by the app.
pub type AppStore = FileStore;

/// Directory holding `entities.json` and `insta.toml`.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("insta")
}

/// Open the app's repository, creating the data directory if needed.
pub fn make_repo() -> Result<Repository<AppStore>, StoreError> {
    Ok(Repository::new(FileStore::open(data_dir())?))
}

/// Read `insta.toml` from the directory the store was opened in.
pub fn load_config(repo: &Repository<AppStore>) -> InstaConfig {
    InstaConfig::load(repo.store().base())
}
