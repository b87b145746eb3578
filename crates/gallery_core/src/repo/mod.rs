//! Repository layer: the gallery data-access façade and its stores.
//!
//! # Responsibility
//! - Define the storage-agnostic `DataAccess` contract.
//! - Isolate SQL and row mapping from service/command orchestration.
//!
//! # Invariants
//! - Write paths validate drafts before touching storage.
//! - Repository APIs return semantic errors (`*NotFound`, `*AlreadyExists`)
//!   in addition to DB transport errors.

pub mod data_access;
pub mod executor;
pub mod memory_gallery;
pub mod sqlite_gallery;
