//! In-process gallery façade for tests and storage-free callers.
//!
//! # Invariants
//! - Matches `SqliteDataAccess` for every data operation, including error
//!   variants and cascade order.
//! - Has no connection lifecycle: `open` and `close` are no-ops and the store
//!   always reports itself open, so `RepoError::NotOpen` is never returned.
//! - Ids are assigned from per-table counters and never reused.

use crate::model::album::{Album, AlbumId, NewAlbum};
use crate::model::picture::{NewPicture, Picture, PictureId};
use crate::model::tag::{Tag, TagId};
use crate::model::user::{NewUser, User, UserId};
use crate::repo::data_access::{DataAccess, RepoError, RepoResult};
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Gallery façade kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDataAccess {
    users: BTreeMap<UserId, User>,
    albums: BTreeMap<AlbumId, Album>,
    pictures: BTreeMap<PictureId, Picture>,
    tags: BTreeMap<TagId, Tag>,
    last_user_id: UserId,
    last_album_id: AlbumId,
    last_picture_id: PictureId,
    last_tag_id: TagId,
}

impl MemoryDataAccess {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_album_by_name(&self, name: &str) -> Option<&Album> {
        let name = name.trim();
        self.albums.values().find(|album| album.name == name)
    }

    fn find_owned_album(&self, name: &str, owner_id: UserId) -> Option<&Album> {
        let name = name.trim();
        self.albums
            .values()
            .find(|album| album.name == name && album.owner_id == owner_id)
    }

    fn find_picture(&self, album_name: &str, picture_name: &str) -> RepoResult<&Picture> {
        let album = self.open_album_ref(album_name)?;
        let picture_name = picture_name.trim();
        self.pictures
            .values()
            .find(|picture| picture.album_id == album.id && picture.name == picture_name)
            .ok_or_else(|| RepoError::PictureNotFound {
                album: album.name.clone(),
                picture: picture_name.to_string(),
            })
    }

    fn open_album_ref(&self, name: &str) -> RepoResult<&Album> {
        self.find_album_by_name(name)
            .ok_or_else(|| RepoError::AlbumNotFound(name.trim().to_string()))
    }

    fn tags_of_user(&self, user_id: UserId) -> impl Iterator<Item = &Tag> {
        self.tags.values().filter(move |tag| tag.user_id == user_id)
    }

    fn remove_pictures_where(&mut self, keep: impl Fn(&Picture) -> bool) -> usize {
        let removed: BTreeSet<PictureId> = self
            .pictures
            .values()
            .filter(|picture| !keep(*picture))
            .map(|picture| picture.id)
            .collect();
        self.tags.retain(|_, tag| !removed.contains(&tag.picture_id));
        self.pictures.retain(|id, _| !removed.contains(id));
        removed.len()
    }

    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

impl DataAccess for MemoryDataAccess {
    // Nothing to connect to; the store is usable from construction on.
    fn open(&mut self) -> RepoResult<()> {
        Ok(())
    }

    fn close(&mut self) {}

    fn clear(&mut self) -> RepoResult<()> {
        self.tags.clear();
        self.pictures.clear();
        self.albums.clear();
        self.users.clear();
        info!("event=gallery_clear module=repo status=ok store=memory");
        Ok(())
    }

    fn is_open(&self) -> bool {
        true
    }

    fn get_albums(&self) -> RepoResult<Vec<Album>> {
        Ok(self.albums.values().cloned().collect())
    }

    fn get_albums_of_user(&self, user: &User) -> RepoResult<Vec<Album>> {
        Ok(self
            .albums
            .values()
            .filter(|album| album.owner_id == user.id)
            .cloned()
            .collect())
    }

    fn create_album(&mut self, album: &NewAlbum) -> RepoResult<Album> {
        let album = album.normalized()?;
        if !self.users.contains_key(&album.owner_id) {
            return Err(RepoError::UserNotFound(album.owner_id));
        }
        if self.find_owned_album(&album.name, album.owner_id).is_some() {
            return Err(RepoError::AlbumAlreadyExists {
                name: album.name,
                owner_id: album.owner_id,
            });
        }

        let created = Album {
            id: Self::next_id(&mut self.last_album_id),
            name: album.name,
            creation_date: album.creation_date,
            owner_id: album.owner_id,
        };
        self.albums.insert(created.id, created.clone());
        Ok(created)
    }

    fn delete_album(&mut self, name: &str, owner_id: UserId) -> RepoResult<()> {
        let album_id = self
            .find_owned_album(name, owner_id)
            .map(|album| album.id)
            .ok_or_else(|| RepoError::OwnedAlbumNotFound {
                name: name.trim().to_string(),
                owner_id,
            })?;

        self.remove_pictures_where(|picture| picture.album_id != album_id);
        self.albums.remove(&album_id);
        Ok(())
    }

    fn does_album_exist(&self, name: &str, owner_id: UserId) -> bool {
        self.find_owned_album(name, owner_id).is_some()
    }

    fn open_album(&self, name: &str) -> RepoResult<Album> {
        self.open_album_ref(name).cloned()
    }

    fn get_pictures_in_album(&self, album_name: &str) -> RepoResult<Vec<Picture>> {
        let album_id = self.open_album_ref(album_name)?.id;
        Ok(self
            .pictures
            .values()
            .filter(|picture| picture.album_id == album_id)
            .cloned()
            .collect())
    }

    fn add_picture_to_album_by_name(
        &mut self,
        album_name: &str,
        picture: &NewPicture,
    ) -> RepoResult<Picture> {
        let picture = picture.normalized()?;
        let album_id = self.open_album_ref(album_name)?.id;
        let duplicate = self
            .pictures
            .values()
            .any(|existing| existing.album_id == album_id && existing.name == picture.name);
        if duplicate {
            return Err(RepoError::PictureAlreadyExists {
                album_id,
                picture: picture.name,
            });
        }

        let created = Picture {
            id: Self::next_id(&mut self.last_picture_id),
            name: picture.name,
            path: picture.path,
            creation_date: picture.creation_date,
            album_id,
        };
        self.pictures.insert(created.id, created.clone());
        Ok(created)
    }

    fn remove_picture_from_album_by_name(
        &mut self,
        album_name: &str,
        picture_name: &str,
    ) -> RepoResult<()> {
        let (album_id, name) = {
            let picture = self.find_picture(album_name, picture_name)?;
            (picture.album_id, picture.name.clone())
        };
        self.remove_pictures_where(|picture| {
            !(picture.album_id == album_id && picture.name == name)
        });
        Ok(())
    }

    fn does_picture_exist_in_album(&self, album_name: &str, picture_name: &str) -> bool {
        self.find_picture(album_name, picture_name).is_ok()
    }

    fn get_picture_from_album(
        &self,
        album_name: &str,
        picture_name: &str,
    ) -> RepoResult<Picture> {
        self.find_picture(album_name, picture_name).cloned()
    }

    fn get_picture(&self, id: PictureId) -> RepoResult<Picture> {
        self.pictures
            .get(&id)
            .cloned()
            .ok_or(RepoError::PictureIdNotFound(id))
    }

    fn tag_user_in_picture(
        &mut self,
        album_name: &str,
        picture_name: &str,
        user_id: UserId,
    ) -> RepoResult<()> {
        let picture_id = self.find_picture(album_name, picture_name)?.id;
        if !self.users.contains_key(&user_id) {
            return Err(RepoError::UserNotFound(user_id));
        }
        let already = self
            .tags
            .values()
            .any(|tag| tag.picture_id == picture_id && tag.user_id == user_id);
        if already {
            return Err(RepoError::AlreadyTagged {
                picture_id,
                user_id,
            });
        }

        let tag = Tag {
            id: Self::next_id(&mut self.last_tag_id),
            picture_id,
            user_id,
        };
        self.tags.insert(tag.id, tag);
        Ok(())
    }

    fn untag_user_in_picture(
        &mut self,
        album_name: &str,
        picture_name: &str,
        user_id: UserId,
    ) -> RepoResult<()> {
        let picture_id = self.find_picture(album_name, picture_name)?.id;
        let before = self.tags.len();
        self.tags
            .retain(|_, tag| !(tag.picture_id == picture_id && tag.user_id == user_id));
        if self.tags.len() == before {
            return Err(RepoError::NotTagged {
                picture_id,
                user_id,
            });
        }
        Ok(())
    }

    fn is_user_tagged_in_picture(&self, user: &User, picture: &Picture) -> bool {
        self.tags
            .values()
            .any(|tag| tag.picture_id == picture.id && tag.user_id == user.id)
    }

    fn get_users_tagged_in_picture(&self, picture: &Picture) -> RepoResult<Vec<User>> {
        let user_ids: BTreeSet<UserId> = self
            .tags
            .values()
            .filter(|tag| tag.picture_id == picture.id)
            .map(|tag| tag.user_id)
            .collect();
        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect())
    }

    fn get_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.users.values().cloned().collect())
    }

    fn create_user(&mut self, user: &NewUser) -> RepoResult<User> {
        let name = user.validated_name()?;
        let id = match user.id {
            Some(id) if self.users.contains_key(&id) => {
                return Err(RepoError::UserAlreadyExists(id))
            }
            Some(id) => {
                self.last_user_id = self.last_user_id.max(id);
                id
            }
            None => Self::next_id(&mut self.last_user_id),
        };

        let created = User { id, name };
        self.users.insert(id, created.clone());
        Ok(created)
    }

    fn delete_user(&mut self, user: &User) -> RepoResult<()> {
        if !self.users.contains_key(&user.id) {
            return Err(RepoError::UserNotFound(user.id));
        }

        self.tags.retain(|_, tag| tag.user_id != user.id);
        let owned: BTreeSet<AlbumId> = self
            .albums
            .values()
            .filter(|album| album.owner_id == user.id)
            .map(|album| album.id)
            .collect();
        self.remove_pictures_where(|picture| !owned.contains(&picture.album_id));
        self.albums.retain(|id, _| !owned.contains(id));
        self.users.remove(&user.id);
        Ok(())
    }

    fn does_user_exist(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    fn does_user_exist_by_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.users.values().any(|user| user.name == name)
    }

    fn get_user(&self, id: UserId) -> RepoResult<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(RepoError::UserNotFound(id))
    }

    fn count_albums_owned_of_user(&self, user: &User) -> RepoResult<u64> {
        Ok(self
            .albums
            .values()
            .filter(|album| album.owner_id == user.id)
            .count() as u64)
    }

    fn count_albums_tagged_of_user(&self, user: &User) -> RepoResult<u64> {
        let albums: BTreeSet<AlbumId> = self
            .tags_of_user(user.id)
            .filter_map(|tag| self.pictures.get(&tag.picture_id))
            .map(|picture| picture.album_id)
            .collect();
        Ok(albums.len() as u64)
    }

    fn count_tags_of_user(&self, user: &User) -> RepoResult<u64> {
        Ok(self.tags_of_user(user.id).count() as u64)
    }

    fn count_tagged_pictures_of_user(&self, user: &User) -> RepoResult<u64> {
        let pictures: BTreeSet<PictureId> = self
            .tags_of_user(user.id)
            .map(|tag| tag.picture_id)
            .collect();
        Ok(pictures.len() as u64)
    }

    fn get_top_tagged_user(&self) -> RepoResult<User> {
        let mut counts: HashMap<UserId, usize> = HashMap::new();
        for tag in self.tags.values() {
            *counts.entry(tag.user_id).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .and_then(|(id, _)| self.users.get(&id).cloned())
            .ok_or(RepoError::NoTaggedUser)
    }

    fn get_top_tagged_picture(&self) -> RepoResult<Picture> {
        let mut counts: HashMap<PictureId, usize> = HashMap::new();
        for tag in self.tags.values() {
            *counts.entry(tag.picture_id).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .and_then(|(id, _)| self.pictures.get(&id).cloned())
            .ok_or(RepoError::NoTaggedPicture)
    }

    fn get_tagged_pictures_of_user(&self, user: &User) -> RepoResult<Vec<Picture>> {
        let tagged: BTreeSet<PictureId> = self.tags.values().map(|tag| tag.picture_id).collect();
        Ok(self
            .pictures
            .values()
            .filter(|picture| tagged.contains(&picture.id))
            .filter(|picture| {
                self.albums
                    .get(&picture.album_id)
                    .is_some_and(|album| album.owner_id == user.id)
            })
            .cloned()
            .collect())
    }
}
