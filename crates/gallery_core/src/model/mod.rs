//! Gallery domain model.
//!
//! # Responsibility
//! - Define the value records persisted by the data-access layer.
//! - Define creation drafts validated before any write reaches storage.
//!
//! # Invariants
//! - Entity ids are surrogate keys assigned by the store.
//! - Names are kept trimmed; empty names never reach storage.
//! - Creation dates use the `YYYY-MM-DD` shape.

pub mod album;
pub mod picture;
pub mod tag;
pub mod user;
pub mod validation;
