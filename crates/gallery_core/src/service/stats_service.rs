//! User statistics and "top tagged" reports.
//!
//! # Invariants
//! - Service APIs never bypass the façade.
//! - Missing tags are reported as `None`, not as errors.

use crate::model::picture::Picture;
use crate::model::user::{User, UserId};
use crate::repo::data_access::{DataAccess, RepoError, RepoResult};
use serde::Serialize;

/// Per-user statistics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub user: User,
    pub albums_owned: u64,
    pub albums_tagged: u64,
    pub tags: u64,
    /// See `DataAccess::average_tags_per_album_of_user` for the ratio used.
    pub average_tags_per_album: f64,
}

/// Most tagged user and picture, when any tag exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTagged {
    pub user: Option<User>,
    pub picture: Option<Picture>,
}

/// Report service over any gallery store.
pub struct GalleryService<D: DataAccess> {
    store: D,
}

impl<D: DataAccess> GalleryService<D> {
    pub fn new(store: D) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut D {
        &mut self.store
    }

    pub fn into_inner(self) -> D {
        self.store
    }

    /// Builds the statistics report of one user.
    ///
    /// Returns `UserNotFound` when `user_id` does not exist.
    pub fn user_statistics(&self, user_id: UserId) -> RepoResult<UserStatistics> {
        let user = self.store.get_user(user_id)?;
        Ok(UserStatistics {
            albums_owned: self.store.count_albums_owned_of_user(&user)?,
            albums_tagged: self.store.count_albums_tagged_of_user(&user)?,
            tags: self.store.count_tags_of_user(&user)?,
            average_tags_per_album: self.store.average_tags_per_album_of_user(&user)?,
            user,
        })
    }

    pub fn top_tagged(&self) -> RepoResult<TopTagged> {
        let user = match self.store.get_top_tagged_user() {
            Ok(user) => Some(user),
            Err(RepoError::NoTaggedUser) => None,
            Err(err) => return Err(err),
        };
        let picture = match self.store.get_top_tagged_picture() {
            Ok(picture) => Some(picture),
            Err(RepoError::NoTaggedPicture) => None,
            Err(err) => return Err(err),
        };
        Ok(TopTagged { user, picture })
    }
}
