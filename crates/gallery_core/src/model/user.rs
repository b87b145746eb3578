//! User records.

use crate::model::validation::{normalize_name, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate key of a user row.
pub type UserId = i64;

/// Persisted gallery user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Draft for `create_user`.
///
/// `id` is normally `None` so the store assigns one. Import paths may pass
/// an explicit id; the store rejects it when already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: Option<UserId>,
    pub name: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Returns the trimmed name, or an error when it is blank.
    pub fn validated_name(&self) -> Result<String, ValidationError> {
        normalize_name("user", &self.name)
    }
}
