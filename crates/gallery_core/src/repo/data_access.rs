//! Gallery data-access contract and its error type.
//!
//! # Responsibility
//! - Define the single façade consumed by the command layer.
//! - Keep storage choice (SQLite file, in-memory) invisible to callers.
//!
//! # Invariants
//! - Lookup-by-identity operations return a not-found error on miss.
//! - `does_*` checks never fail; store errors read as `false`.
//! - Deletions report a not-found error when nothing matched.
//! - Results are owned collections built per call.

use crate::db::DbError;
use crate::model::album::{Album, AlbumId, NewAlbum};
use crate::model::picture::{NewPicture, Picture, PictureId};
use crate::model::user::{NewUser, User, UserId};
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for every gallery data-access operation.
#[derive(Debug)]
pub enum RepoError {
    /// Store open/statement failure.
    Db(DbError),
    /// Draft rejected before reaching storage.
    Validation(ValidationError),
    /// Operation called before `open()` or after `close()`.
    NotOpen,
    UserNotFound(UserId),
    /// No album with this name under any owner.
    AlbumNotFound(String),
    /// No album with this name under the given owner.
    OwnedAlbumNotFound { name: String, owner_id: UserId },
    PictureNotFound { album: String, picture: String },
    PictureIdNotFound(PictureId),
    NoAlbums,
    NoUsers,
    NoTaggedUser,
    NoTaggedPicture,
    UserAlreadyExists(UserId),
    AlbumAlreadyExists { name: String, owner_id: UserId },
    PictureAlreadyExists { album_id: AlbumId, picture: String },
    AlreadyTagged { picture_id: PictureId, user_id: UserId },
    NotTagged { picture_id: PictureId, user_id: UserId },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl RepoError {
    /// Returns whether this error means "the requested entity does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::AlbumNotFound(_)
                | Self::OwnedAlbumNotFound { .. }
                | Self::PictureNotFound { .. }
                | Self::PictureIdNotFound(_)
                | Self::NoAlbums
                | Self::NoUsers
                | Self::NoTaggedUser
                | Self::NoTaggedPicture
                | Self::NotTagged { .. }
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotOpen => write!(f, "gallery store is not open"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::AlbumNotFound(name) => write!(f, "album not found: `{name}`"),
            Self::OwnedAlbumNotFound { name, owner_id } => {
                write!(f, "album `{name}` not found for user {owner_id}")
            }
            Self::PictureNotFound { album, picture } => {
                write!(f, "picture `{picture}` not found in album `{album}`")
            }
            Self::PictureIdNotFound(id) => write!(f, "picture not found: {id}"),
            Self::NoAlbums => write!(f, "there are no albums in the gallery"),
            Self::NoUsers => write!(f, "there are no users in the gallery"),
            Self::NoTaggedUser => write!(f, "no user has been tagged yet"),
            Self::NoTaggedPicture => write!(f, "no picture has been tagged yet"),
            Self::UserAlreadyExists(id) => write!(f, "user already exists: {id}"),
            Self::AlbumAlreadyExists { name, owner_id } => {
                write!(f, "album `{name}` already exists for user {owner_id}")
            }
            Self::PictureAlreadyExists { album_id, picture } => {
                write!(f, "picture `{picture}` already exists in album {album_id}")
            }
            Self::AlreadyTagged {
                picture_id,
                user_id,
            } => write!(f, "user {user_id} is already tagged in picture {picture_id}"),
            Self::NotTagged {
                picture_id,
                user_id,
            } => write!(f, "user {user_id} is not tagged in picture {picture_id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted gallery data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Storage-agnostic gallery façade.
///
/// Both `SqliteDataAccess` and `MemoryDataAccess` implement this trait, so
/// the command layer never depends on the concrete store.
pub trait DataAccess {
    /// Opens the store and ensures the schema. Safe to call repeatedly.
    fn open(&mut self) -> RepoResult<()>;
    /// Releases the store. Later calls fail with `NotOpen` until reopened.
    fn close(&mut self);
    /// Deletes every user, album, picture and tag.
    fn clear(&mut self) -> RepoResult<()>;
    fn is_open(&self) -> bool;

    // album related
    /// Returns all albums. Callers must not rely on the order.
    fn get_albums(&self) -> RepoResult<Vec<Album>>;
    fn get_albums_of_user(&self, user: &User) -> RepoResult<Vec<Album>>;
    /// Inserts an album for an existing owner.
    ///
    /// # Errors
    /// - `Validation` for a blank name or malformed date.
    /// - `UserNotFound` when the owner does not exist.
    /// - `AlbumAlreadyExists` when the owner already has that name.
    fn create_album(&mut self, album: &NewAlbum) -> RepoResult<Album>;
    /// Deletes tags on the album pictures, the pictures, then the album.
    fn delete_album(&mut self, name: &str, owner_id: UserId) -> RepoResult<()>;
    fn does_album_exist(&self, name: &str, owner_id: UserId) -> bool;
    /// Resolves an album by trimmed name across all owners.
    ///
    /// When several owners use the same name, any one of them is returned.
    fn open_album(&self, name: &str) -> RepoResult<Album>;
    /// Releases an album handle returned by `open_album`. No-op for both stores.
    fn close_album(&self, _album: &Album) {}
    fn get_pictures_in_album(&self, album_name: &str) -> RepoResult<Vec<Picture>>;

    // picture related
    fn add_picture_to_album_by_name(
        &mut self,
        album_name: &str,
        picture: &NewPicture,
    ) -> RepoResult<Picture>;
    /// Removes a picture and its tags.
    fn remove_picture_from_album_by_name(
        &mut self,
        album_name: &str,
        picture_name: &str,
    ) -> RepoResult<()>;
    fn does_picture_exist_in_album(&self, album_name: &str, picture_name: &str) -> bool;
    fn get_picture_from_album(&self, album_name: &str, picture_name: &str)
        -> RepoResult<Picture>;
    fn get_picture(&self, id: PictureId) -> RepoResult<Picture>;
    /// Tags a user in a picture.
    ///
    /// # Errors
    /// - `AlbumNotFound` / `PictureNotFound` when the picture cannot be resolved.
    /// - `UserNotFound` when the user does not exist.
    /// - `AlreadyTagged` when the pair is already tagged.
    fn tag_user_in_picture(
        &mut self,
        album_name: &str,
        picture_name: &str,
        user_id: UserId,
    ) -> RepoResult<()>;
    fn untag_user_in_picture(
        &mut self,
        album_name: &str,
        picture_name: &str,
        user_id: UserId,
    ) -> RepoResult<()>;
    fn is_user_tagged_in_picture(&self, user: &User, picture: &Picture) -> bool;
    /// Returns each tagged user once, however many tag rows exist.
    fn get_users_tagged_in_picture(&self, picture: &Picture) -> RepoResult<Vec<User>>;

    // user related
    fn get_users(&self) -> RepoResult<Vec<User>>;
    fn create_user(&mut self, user: &NewUser) -> RepoResult<User>;
    /// Deletes the user's tags, owned albums (with their pictures and the
    /// tags on them), then the user.
    fn delete_user(&mut self, user: &User) -> RepoResult<()>;
    fn does_user_exist(&self, id: UserId) -> bool;
    fn does_user_exist_by_name(&self, name: &str) -> bool;
    fn get_user(&self, id: UserId) -> RepoResult<User>;

    // user statistics
    fn count_albums_owned_of_user(&self, user: &User) -> RepoResult<u64>;
    /// Distinct albums holding at least one picture the user is tagged in.
    fn count_albums_tagged_of_user(&self, user: &User) -> RepoResult<u64>;
    fn count_tags_of_user(&self, user: &User) -> RepoResult<u64>;
    /// Distinct pictures the user is tagged in.
    fn count_tagged_pictures_of_user(&self, user: &User) -> RepoResult<u64>;

    /// Tagged pictures of the user divided by albums the user owns.
    ///
    /// The numerator counts pictures the user appears in anywhere, while the
    /// denominator counts albums the user owns. The two are unrelated sets;
    /// the ratio is kept as-is for compatibility with existing reports.
    /// Returns `0.0` when the user owns no albums.
    fn average_tags_per_album_of_user(&self, user: &User) -> RepoResult<f64> {
        let owned = self.count_albums_owned_of_user(user)?;
        if owned == 0 {
            return Ok(0.0);
        }
        let tagged = self.count_tagged_pictures_of_user(user)?;
        Ok(tagged as f64 / owned as f64)
    }

    // queries
    /// Returns any user with the maximal tag count.
    fn get_top_tagged_user(&self) -> RepoResult<User>;
    /// Returns any picture with the maximal tag count.
    fn get_top_tagged_picture(&self) -> RepoResult<Picture>;
    /// Pictures in albums owned by `user` that carry at least one tag.
    ///
    /// This is not "pictures the user is tagged in".
    fn get_tagged_pictures_of_user(&self, user: &User) -> RepoResult<Vec<Picture>>;

    /// Renders all albums as a text listing.
    fn render_albums(&self) -> RepoResult<String> {
        let mut albums = self.get_albums()?;
        if albums.is_empty() {
            return Err(RepoError::NoAlbums);
        }
        albums.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));

        let mut out = String::from("Album list:\n-----------\n");
        for album in &albums {
            out.push_str(&format!(
                "   + [{}] - created by user@{} on {}\n",
                album.name, album.owner_id, album.creation_date
            ));
        }
        Ok(out)
    }

    /// Renders all users as a text listing.
    fn render_users(&self) -> RepoResult<String> {
        let mut users = self.get_users()?;
        if users.is_empty() {
            return Err(RepoError::NoUsers);
        }
        users.sort_by_key(|user| user.id);

        let mut out = String::from("Users list:\n-----------\n");
        for user in &users {
            out.push_str(&format!("   + @{} - {}\n", user.id, user.name));
        }
        Ok(out)
    }
}
