//! Resonance content store
//!
//! Profiles, albums, tracks, playlists, saved library items and listening
//! history, kept in SQLite through sqlx.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod search;

pub use connection::{close, connect, database_exists, DatabaseConfig, DbPool};
pub use migrations::{applied_version, current_version, run_migrations, verify_integrity};
pub use search::{search, SearchLimits, SearchResults};
