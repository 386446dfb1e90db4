pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod seed;

mod collections;

mod memory;
pub use memory::MemoryStore;

mod file_store;
pub use file_store::FileStore;

pub use config::InstaConfig;
pub use error::StoreError;
pub use models::{MediaKind, Post, Story, User};
pub use repo::{Entity, EntityKind, EntityStore, FetchRequest, Filter, Repository};
pub use seed::{SeedFeed, SeedReport, Seeder};
