//! Core data-access layer for the photo gallery.
//! This crate is the single source of truth for gallery invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::GalleryConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::album::{Album, AlbumId, NewAlbum};
pub use model::picture::{NewPicture, Picture, PictureId};
pub use model::tag::{Tag, TagId};
pub use model::user::{NewUser, User, UserId};
pub use model::validation::ValidationError;
pub use repo::data_access::{DataAccess, RepoError, RepoResult};
pub use repo::memory_gallery::MemoryDataAccess;
pub use repo::sqlite_gallery::{DbLocation, SqliteDataAccess};
pub use service::stats_service::{GalleryService, TopTagged, UserStatistics};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
