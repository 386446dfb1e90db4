//! # Filesystem-backed entity store
//!
//! [`FileStore`] is an [`EntityStore`] implementation that persists every entity
//! to the local filesystem. It is used on desktop and mobile platforms to retain
//! the feed and stories across app restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── entities.json        # users, posts and stories tables
//! └── insta.toml           # optional app configuration (see crate::config)
//! ```
//!
//! Every operation reads `entities.json`, applies the change and writes it back
//! through a temporary file followed by a rename, so a crash mid-write leaves the
//! previous snapshot intact. A missing file reads as an empty store.
//!
//! ## Platform data directories
//!
//! Use `dirs::data_dir()` to obtain a platform-appropriate base:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS / iOS | `~/Library/Application Support/insta/` |
//! | Linux | `~/.local/share/insta/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\insta\` |
//! | Android | App-internal storage (via `dirs`) |

use std::path::{Path, PathBuf};

use crate::collections::Collections;
use crate::error::StoreError;
use crate::repo::{Entity, EntityKind, EntityStore, FetchRequest};

const ENTITIES_FILE: &str = "entities.json";

/// Filesystem-backed EntityStore for desktop and mobile persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `base`.
    ///
    /// Failing here is a startup configuration error: the directory could not
    /// be created or is not writable.
    pub fn open(base: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&base)?;
        tracing::debug!(path = %base.display(), "opened file store");
        Ok(Self { base })
    }

    /// Directory this store lives in.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn entities_path(&self) -> PathBuf {
        self.base.join(ENTITIES_FILE)
    }

    fn load(&self) -> Result<Collections, StoreError> {
        match std::fs::read(self.entities_path()) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Collections::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, tables: &Collections) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(tables)?;
        let tmp = self.base.join(format!("{ENTITIES_FILE}.tmp"));
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(tmp, self.entities_path())?;
        Ok(())
    }
}

impl EntityStore for FileStore {
    fn is_ready(&self) -> bool {
        self.base.is_dir()
    }

    async fn fetch<E: Entity>(&self, request: &FetchRequest) -> Result<Vec<E>, StoreError> {
        self.load()?.fetch(request)
    }

    async fn save<E: Entity>(&self, entities: &[E]) -> Result<(), StoreError> {
        let mut tables = self.load()?;
        tables.save(entities)?;
        self.persist(&tables)
    }

    async fn batch_delete(&self, kind: EntityKind) -> Result<usize, StoreError> {
        let mut tables = self.load()?;
        let removed = tables.batch_delete(kind);
        self.persist(&tables)?;
        tracing::debug!(%kind, removed, "batch delete");
        Ok(removed)
    }

    async fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        Ok(self.load()?.count(kind))
    }
}
