//! Core use-case services.
//!
//! # Responsibility
//! - Compose façade calls into report-level results for the command layer.
//! - Stay storage-agnostic by depending only on `DataAccess`.

pub mod stats_service;
