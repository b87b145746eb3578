//! Album records.
//!
//! # Invariants
//! - `(name, owner_id)` is unique; the same name may exist under different
//!   owners.
//! - `owner_id` references an existing user.

use crate::model::user::UserId;
use crate::model::validation::{normalize_name, validate_creation_date, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate key of an album row.
pub type AlbumId = i64;

/// Persisted album owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    /// `YYYY-MM-DD`.
    pub creation_date: String,
    pub owner_id: UserId,
}

/// Draft for `create_album`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlbum {
    pub name: String,
    pub creation_date: String,
    pub owner_id: UserId,
}

impl NewAlbum {
    pub fn new(
        name: impl Into<String>,
        creation_date: impl Into<String>,
        owner_id: UserId,
    ) -> Self {
        Self {
            name: name.into(),
            creation_date: creation_date.into(),
            owner_id,
        }
    }

    /// Validates the draft and returns it with its name trimmed.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = normalize_name("album", &self.name)?;
        validate_creation_date(&self.creation_date)?;
        Ok(Self {
            name,
            creation_date: self.creation_date.clone(),
            owner_id: self.owner_id,
        })
    }
}
