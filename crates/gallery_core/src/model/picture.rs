//! Picture records.

use crate::model::album::AlbumId;
use crate::model::validation::{normalize_name, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate key of a picture row.
pub type PictureId = i64;

/// Persisted picture inside one album.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Picture {
    pub id: PictureId,
    pub name: String,
    /// File system location of the image. Stored verbatim.
    pub path: String,
    /// Free-form; stored as given.
    pub creation_date: String,
    pub album_id: AlbumId,
}

/// Draft for `add_picture_to_album_by_name`. The album is resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPicture {
    pub name: String,
    pub path: String,
    pub creation_date: String,
}

impl NewPicture {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        creation_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            creation_date: creation_date.into(),
        }
    }

    /// Returns the draft with its name trimmed. Path and date are kept verbatim.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = normalize_name("picture", &self.name)?;
        Ok(Self {
            name,
            path: self.path.clone(),
            creation_date: self.creation_date.clone(),
        })
    }
}
