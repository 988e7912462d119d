//! Database models and SQLite-backed stores

pub mod bands;
pub mod init;
pub mod models;
pub mod sessions;

pub use bands::SqliteCatalogStore;
pub use init::*;
pub use models::*;
pub use sessions::SqliteSessionStore;
pub use sqlx::SqlitePool;
