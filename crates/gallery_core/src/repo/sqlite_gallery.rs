//! SQLite-backed gallery façade.
//!
//! # Responsibility
//! - Implement `DataAccess` over the USERS/ALBUMS/PICTURES/TAGS tables.
//! - Enforce referential checks before writes, in addition to SQLite
//!   foreign keys.
//!
//! # Invariants
//! - Cascading deletes run children-first inside one transaction.
//! - Names are trimmed before every insert and lookup.
//! - Log events carry ids only, never user-entered names.

use crate::db::schema::clear_all;
use crate::db::{open_db, open_db_in_memory};
use crate::model::album::{Album, NewAlbum};
use crate::model::picture::{NewPicture, Picture, PictureId};
use crate::model::user::{NewUser, User, UserId};
use crate::repo::data_access::{DataAccess, RepoError, RepoResult};
use crate::repo::executor::{select_columns, select_from, QueryExecutor};
use log::{info, warn};
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::PathBuf;

/// Where `SqliteDataAccess::open` connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Fresh private database per `open`; contents are lost on `close`.
    Memory,
}

/// Gallery façade over one SQLite connection.
pub struct SqliteDataAccess {
    location: DbLocation,
    conn: Option<Connection>,
}

impl SqliteDataAccess {
    pub fn new(location: DbLocation) -> Self {
        Self {
            location,
            conn: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(DbLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(DbLocation::Memory)
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Underlying connection while open. Intended for diagnostics and tests.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn conn(&self) -> RepoResult<&Connection> {
        self.conn.as_ref().ok_or(RepoError::NotOpen)
    }

    fn conn_mut(&mut self) -> RepoResult<&mut Connection> {
        self.conn.as_mut().ok_or(RepoError::NotOpen)
    }

    fn executor(&self) -> RepoResult<QueryExecutor<'_>> {
        Ok(QueryExecutor::new(self.conn()?))
    }

    fn find_album_by_name(&self, name: &str) -> RepoResult<Option<Album>> {
        let sql = format!(
            "{} WHERE a.NAME = ?1 ORDER BY a.ID LIMIT 1",
            select_from::<Album>("a")
        );
        self.executor()?.fetch_optional(&sql, [name.trim()])
    }

    fn find_owned_album(&self, name: &str, owner_id: UserId) -> RepoResult<Option<Album>> {
        let sql = format!(
            "{} WHERE a.NAME = ?1 AND a.USER_ID = ?2 ORDER BY a.ID LIMIT 1",
            select_from::<Album>("a")
        );
        self.executor()?
            .fetch_optional(&sql, params![name.trim(), owner_id])
    }

    fn find_picture(&self, album_name: &str, picture_name: &str) -> RepoResult<Picture> {
        let album = self.open_album(album_name)?;
        let picture_name = picture_name.trim();
        let sql = format!(
            "{} WHERE p.ALBUM_ID = ?1 AND p.NAME = ?2 ORDER BY p.ID LIMIT 1",
            select_from::<Picture>("p")
        );
        self.executor()?
            .fetch_optional(&sql, params![album.id, picture_name])?
            .ok_or_else(|| RepoError::PictureNotFound {
                album: album.name,
                picture: picture_name.to_string(),
            })
    }

    fn user_exists(&self, id: UserId) -> RepoResult<bool> {
        self.executor()?
            .fetch_exists("SELECT EXISTS(SELECT 1 FROM USERS WHERE ID = ?1);", [id])
    }

    fn count_for_user(&self, sql: &str, user: &User) -> RepoResult<u64> {
        self.executor()?.fetch_count(sql, [user.id])
    }
}

impl DataAccess for SqliteDataAccess {
    fn open(&mut self) -> RepoResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn = match &self.location {
            DbLocation::File(path) => open_db(path)?,
            DbLocation::Memory => open_db_in_memory()?,
        };
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) {
        if self.conn.take().is_some() {
            info!("event=db_close module=repo status=ok");
        }
    }

    fn clear(&mut self) -> RepoResult<()> {
        clear_all(self.conn()?)?;
        info!("event=gallery_clear module=repo status=ok");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn get_albums(&self) -> RepoResult<Vec<Album>> {
        self.executor()?.fetch_all(&select_from::<Album>("a"), [])
    }

    fn get_albums_of_user(&self, user: &User) -> RepoResult<Vec<Album>> {
        let sql = format!("{} WHERE a.USER_ID = ?1", select_from::<Album>("a"));
        self.executor()?.fetch_all(&sql, [user.id])
    }

    fn create_album(&mut self, album: &NewAlbum) -> RepoResult<Album> {
        let album = album.normalized()?;
        if !self.user_exists(album.owner_id)? {
            return Err(RepoError::UserNotFound(album.owner_id));
        }
        if self.find_owned_album(&album.name, album.owner_id)?.is_some() {
            return Err(RepoError::AlbumAlreadyExists {
                name: album.name,
                owner_id: album.owner_id,
            });
        }

        let executor = self.executor()?;
        executor.execute(
            "INSERT INTO ALBUMS (NAME, CREATION_DATE, USER_ID) VALUES (?1, ?2, ?3);",
            params![album.name, album.creation_date, album.owner_id],
        )?;
        let id = executor.last_insert_id();
        info!(
            "event=album_create module=repo status=ok album_id={id} owner_id={}",
            album.owner_id
        );

        Ok(Album {
            id,
            name: album.name,
            creation_date: album.creation_date,
            owner_id: album.owner_id,
        })
    }

    fn delete_album(&mut self, name: &str, owner_id: UserId) -> RepoResult<()> {
        let album = self
            .find_owned_album(name, owner_id)?
            .ok_or_else(|| RepoError::OwnedAlbumNotFound {
                name: name.trim().to_string(),
                owner_id,
            })?;

        let tx = self
            .conn_mut()?
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let executor = QueryExecutor::new(&tx);
        let tags = executor.execute(
            "DELETE FROM TAGS
             WHERE PICTURE_ID IN (SELECT ID FROM PICTURES WHERE ALBUM_ID = ?1);",
            [album.id],
        )?;
        let pictures = executor.execute("DELETE FROM PICTURES WHERE ALBUM_ID = ?1;", [album.id])?;
        executor.execute("DELETE FROM ALBUMS WHERE ID = ?1;", [album.id])?;
        tx.commit()?;

        info!(
            "event=album_delete module=repo status=ok album_id={} owner_id={owner_id} pictures={pictures} tags={tags}",
            album.id
        );
        Ok(())
    }

    fn does_album_exist(&self, name: &str, owner_id: UserId) -> bool {
        or_false(
            "does_album_exist",
            self.find_owned_album(name, owner_id)
                .map(|album| album.is_some()),
        )
    }

    fn open_album(&self, name: &str) -> RepoResult<Album> {
        self.find_album_by_name(name)?
            .ok_or_else(|| RepoError::AlbumNotFound(name.trim().to_string()))
    }

    fn get_pictures_in_album(&self, album_name: &str) -> RepoResult<Vec<Picture>> {
        let album = self.open_album(album_name)?;
        let sql = format!(
            "{} WHERE p.ALBUM_ID = ?1 ORDER BY p.ID",
            select_from::<Picture>("p")
        );
        self.executor()?.fetch_all(&sql, [album.id])
    }

    fn add_picture_to_album_by_name(
        &mut self,
        album_name: &str,
        picture: &NewPicture,
    ) -> RepoResult<Picture> {
        let picture = picture.normalized()?;
        let album = self.open_album(album_name)?;

        let executor = self.executor()?;
        let duplicate = executor.fetch_exists(
            "SELECT EXISTS(SELECT 1 FROM PICTURES WHERE ALBUM_ID = ?1 AND NAME = ?2);",
            params![album.id, picture.name],
        )?;
        if duplicate {
            return Err(RepoError::PictureAlreadyExists {
                album_id: album.id,
                picture: picture.name,
            });
        }

        executor.execute(
            "INSERT INTO PICTURES (NAME, LOCATION, CREATION_DATE, ALBUM_ID)
             VALUES (?1, ?2, ?3, ?4);",
            params![picture.name, picture.path, picture.creation_date, album.id],
        )?;
        let id = executor.last_insert_id();
        info!(
            "event=picture_add module=repo status=ok picture_id={id} album_id={}",
            album.id
        );

        Ok(Picture {
            id,
            name: picture.name,
            path: picture.path,
            creation_date: picture.creation_date,
            album_id: album.id,
        })
    }

    fn remove_picture_from_album_by_name(
        &mut self,
        album_name: &str,
        picture_name: &str,
    ) -> RepoResult<()> {
        let picture = self.find_picture(album_name, picture_name)?;

        let tx = self
            .conn_mut()?
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let executor = QueryExecutor::new(&tx);
        executor.execute(
            "DELETE FROM TAGS
             WHERE PICTURE_ID IN (
                SELECT ID FROM PICTURES WHERE ALBUM_ID = ?1 AND NAME = ?2
             );",
            params![picture.album_id, picture.name],
        )?;
        let removed = executor.execute(
            "DELETE FROM PICTURES WHERE ALBUM_ID = ?1 AND NAME = ?2;",
            params![picture.album_id, picture.name],
        )?;
        tx.commit()?;

        info!(
            "event=picture_remove module=repo status=ok album_id={} removed={removed}",
            picture.album_id
        );
        Ok(())
    }

    fn does_picture_exist_in_album(&self, album_name: &str, picture_name: &str) -> bool {
        match self.find_picture(album_name, picture_name) {
            Ok(_) => true,
            Err(err) if err.is_not_found() => false,
            Err(err) => or_false("does_picture_exist_in_album", Err(err)),
        }
    }

    fn get_picture_from_album(
        &self,
        album_name: &str,
        picture_name: &str,
    ) -> RepoResult<Picture> {
        self.find_picture(album_name, picture_name)
    }

    fn get_picture(&self, id: PictureId) -> RepoResult<Picture> {
        let sql = format!("{} WHERE p.ID = ?1", select_from::<Picture>("p"));
        self.executor()?
            .fetch_optional(&sql, [id])?
            .ok_or(RepoError::PictureIdNotFound(id))
    }

    fn tag_user_in_picture(
        &mut self,
        album_name: &str,
        picture_name: &str,
        user_id: UserId,
    ) -> RepoResult<()> {
        let picture = self.find_picture(album_name, picture_name)?;
        if !self.user_exists(user_id)? {
            return Err(RepoError::UserNotFound(user_id));
        }

        let executor = self.executor()?;
        let already = executor.fetch_exists(
            "SELECT EXISTS(SELECT 1 FROM TAGS WHERE PICTURE_ID = ?1 AND USER_ID = ?2);",
            [picture.id, user_id],
        )?;
        if already {
            return Err(RepoError::AlreadyTagged {
                picture_id: picture.id,
                user_id,
            });
        }

        executor.execute(
            "INSERT INTO TAGS (PICTURE_ID, USER_ID) VALUES (?1, ?2);",
            [picture.id, user_id],
        )?;
        info!(
            "event=user_tag module=repo status=ok picture_id={} user_id={user_id}",
            picture.id
        );
        Ok(())
    }

    fn untag_user_in_picture(
        &mut self,
        album_name: &str,
        picture_name: &str,
        user_id: UserId,
    ) -> RepoResult<()> {
        let picture = self.find_picture(album_name, picture_name)?;
        let removed = self.executor()?.execute(
            "DELETE FROM TAGS WHERE PICTURE_ID = ?1 AND USER_ID = ?2;",
            [picture.id, user_id],
        )?;
        if removed == 0 {
            return Err(RepoError::NotTagged {
                picture_id: picture.id,
                user_id,
            });
        }

        info!(
            "event=user_untag module=repo status=ok picture_id={} user_id={user_id} removed={removed}",
            picture.id
        );
        Ok(())
    }

    fn is_user_tagged_in_picture(&self, user: &User, picture: &Picture) -> bool {
        let result = self.executor().and_then(|executor| {
            executor.fetch_count(
                "SELECT COUNT(*) FROM TAGS WHERE PICTURE_ID = ?1 AND USER_ID = ?2;",
                [picture.id, user.id],
            )
        });
        or_false("is_user_tagged_in_picture", result.map(|count| count > 0))
    }

    fn get_users_tagged_in_picture(&self, picture: &Picture) -> RepoResult<Vec<User>> {
        let sql = format!(
            "SELECT DISTINCT {}
             FROM USERS u
             INNER JOIN TAGS t ON t.USER_ID = u.ID
             WHERE t.PICTURE_ID = ?1
             ORDER BY u.ID",
            select_columns::<User>("u")
        );
        self.executor()?.fetch_all(&sql, [picture.id])
    }

    fn get_users(&self) -> RepoResult<Vec<User>> {
        self.executor()?.fetch_all(&select_from::<User>("u"), [])
    }

    fn create_user(&mut self, user: &NewUser) -> RepoResult<User> {
        let name = user.validated_name()?;
        let executor = self.executor()?;

        let id = match user.id {
            Some(id) => {
                if self.user_exists(id)? {
                    return Err(RepoError::UserAlreadyExists(id));
                }
                executor.execute(
                    "INSERT INTO USERS (ID, NAME) VALUES (?1, ?2);",
                    params![id, name],
                )?;
                id
            }
            None => {
                executor.execute("INSERT INTO USERS (NAME) VALUES (?1);", [name.as_str()])?;
                executor.last_insert_id()
            }
        };

        info!("event=user_create module=repo status=ok user_id={id}");
        Ok(User { id, name })
    }

    fn delete_user(&mut self, user: &User) -> RepoResult<()> {
        if !self.user_exists(user.id)? {
            return Err(RepoError::UserNotFound(user.id));
        }

        let tx = self
            .conn_mut()?
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let executor = QueryExecutor::new(&tx);
        let own_tags = executor.execute("DELETE FROM TAGS WHERE USER_ID = ?1;", [user.id])?;
        let album_tags = executor.execute(
            "DELETE FROM TAGS
             WHERE PICTURE_ID IN (
                SELECT p.ID
                FROM PICTURES p
                INNER JOIN ALBUMS a ON a.ID = p.ALBUM_ID
                WHERE a.USER_ID = ?1
             );",
            [user.id],
        )?;
        let pictures = executor.execute(
            "DELETE FROM PICTURES
             WHERE ALBUM_ID IN (SELECT ID FROM ALBUMS WHERE USER_ID = ?1);",
            [user.id],
        )?;
        let albums = executor.execute("DELETE FROM ALBUMS WHERE USER_ID = ?1;", [user.id])?;
        executor.execute("DELETE FROM USERS WHERE ID = ?1;", [user.id])?;
        tx.commit()?;

        info!(
            "event=user_delete module=repo status=ok user_id={} albums={albums} pictures={pictures} tags={}",
            user.id,
            own_tags + album_tags
        );
        Ok(())
    }

    fn does_user_exist(&self, id: UserId) -> bool {
        or_false("does_user_exist", self.user_exists(id))
    }

    fn does_user_exist_by_name(&self, name: &str) -> bool {
        let result = self.executor().and_then(|executor| {
            executor.fetch_exists(
                "SELECT EXISTS(SELECT 1 FROM USERS WHERE NAME = ?1);",
                [name.trim()],
            )
        });
        or_false("does_user_exist_by_name", result)
    }

    fn get_user(&self, id: UserId) -> RepoResult<User> {
        let sql = format!("{} WHERE u.ID = ?1", select_from::<User>("u"));
        self.executor()?
            .fetch_optional(&sql, [id])?
            .ok_or(RepoError::UserNotFound(id))
    }

    fn count_albums_owned_of_user(&self, user: &User) -> RepoResult<u64> {
        self.count_for_user("SELECT COUNT(*) FROM ALBUMS WHERE USER_ID = ?1;", user)
    }

    fn count_albums_tagged_of_user(&self, user: &User) -> RepoResult<u64> {
        self.count_for_user(
            "SELECT COUNT(DISTINCT p.ALBUM_ID)
             FROM TAGS t
             INNER JOIN PICTURES p ON p.ID = t.PICTURE_ID
             WHERE t.USER_ID = ?1;",
            user,
        )
    }

    fn count_tags_of_user(&self, user: &User) -> RepoResult<u64> {
        self.count_for_user("SELECT COUNT(*) FROM TAGS WHERE USER_ID = ?1;", user)
    }

    fn count_tagged_pictures_of_user(&self, user: &User) -> RepoResult<u64> {
        self.count_for_user(
            "SELECT COUNT(DISTINCT PICTURE_ID) FROM TAGS WHERE USER_ID = ?1;",
            user,
        )
    }

    fn get_top_tagged_user(&self) -> RepoResult<User> {
        let sql = format!(
            "SELECT {}
             FROM USERS u
             INNER JOIN TAGS t ON t.USER_ID = u.ID
             GROUP BY u.ID
             ORDER BY COUNT(t.ID) DESC
             LIMIT 1",
            select_columns::<User>("u")
        );
        self.executor()?
            .fetch_optional(&sql, [])?
            .ok_or(RepoError::NoTaggedUser)
    }

    fn get_top_tagged_picture(&self) -> RepoResult<Picture> {
        let sql = format!(
            "SELECT {}
             FROM PICTURES p
             INNER JOIN TAGS t ON t.PICTURE_ID = p.ID
             GROUP BY p.ID
             ORDER BY COUNT(t.ID) DESC
             LIMIT 1",
            select_columns::<Picture>("p")
        );
        self.executor()?
            .fetch_optional(&sql, [])?
            .ok_or(RepoError::NoTaggedPicture)
    }

    fn get_tagged_pictures_of_user(&self, user: &User) -> RepoResult<Vec<Picture>> {
        let sql = format!(
            "SELECT DISTINCT {}
             FROM PICTURES p
             INNER JOIN ALBUMS a ON a.ID = p.ALBUM_ID
             INNER JOIN TAGS t ON t.PICTURE_ID = p.ID
             WHERE a.USER_ID = ?1
             ORDER BY p.ID",
            select_columns::<Picture>("p")
        );
        self.executor()?.fetch_all(&sql, [user.id])
    }
}

fn or_false(op: &str, result: RepoResult<bool>) -> bool {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!("event=existence_check module=repo status=error op={op} error={err}");
            false
        }
    }
}
