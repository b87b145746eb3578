//! Tag records: "user appears in picture".

use crate::model::picture::PictureId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Surrogate key of a tag row.
pub type TagId = i64;

/// Persisted tag linking one user to one picture.
///
/// `(picture_id, user_id)` is treated as a set key by every read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub picture_id: PictureId,
    pub user_id: UserId,
}
