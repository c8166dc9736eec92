//! Pin repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Read pins (filtered listing, detail with comments).
//! - Insert pins and comments, returning store-assigned fields.
//! - Own the like toggle as one atomic unit of work.
//!
//! # Invariants
//! - `pins.likes_count` equals the number of `likes` rows for the pin after
//!   every committed transaction.
//! - Counter changes are relative updates (`likes_count = likes_count + ?`),
//!   never a write-back of a value read earlier.
//! - Write paths take the write lock up front (`BEGIN IMMEDIATE`); a
//!   transaction that is not committed rolls back when dropped.

use crate::db::DbError;
use crate::model::pin::{
    ClientId, Comment, LikeState, NewComment, NewPin, Pin, PinDetail, PinId, SortOrder,
};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{
    ffi, params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PIN_COLUMNS: &str = "id, title, description, content, created_at, likes_count";
const COMMENT_COLUMNS: &str = "id, pin_id, username, content, created_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pin persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Referenced pin does not exist.
    NotFound(PinId),
    /// Uniqueness violation or lock contention; safe for the caller to retry.
    Conflict(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pin not found: {id}"),
            Self::Conflict(message) => write!(f, "conflicting concurrent write: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Conflict(_) => None,
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
        if let rusqlite::Error::SqliteFailure(failure, _) = &value {
            let transient = matches!(
                failure.extended_code,
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
            ) || matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            );
            if transient {
                return Self::Conflict(value.to_string());
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing pins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinListQuery {
    /// Case-insensitive substring matched against title, description and content.
    pub search: Option<String>,
    pub sort: SortOrder,
}

/// Repository interface for pin operations.
pub trait PinRepository {
    fn list_pins(&mut self, query: &PinListQuery) -> RepoResult<Vec<Pin>>;
    fn get_pin_detail(&mut self, id: PinId) -> RepoResult<Option<PinDetail>>;
    fn create_pin(&mut self, pin: &NewPin) -> RepoResult<Pin>;
    /// Relies on the store's foreign key; a missing pin yields `NotFound`.
    fn create_comment(&mut self, comment: &NewComment) -> RepoResult<Comment>;
    /// Flips the like state of `(pin_id, client)` and adjusts the counter.
    fn toggle_like(&mut self, pin_id: PinId, client: &ClientId) -> RepoResult<LikeState>;
}

/// SQLite-backed pin repository over one borrowed connection.
pub struct SqlitePinRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePinRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or a
    /// [`crate::db::ConnectionSource`].
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl PinRepository for SqlitePinRepository<'_> {
    fn list_pins(&mut self, query: &PinListQuery) -> RepoResult<Vec<Pin>> {
        let mut sql = format!("SELECT {PIN_COLUMNS} FROM pins");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                sql.push_str(
                    " WHERE instr(casefold(title), casefold(?1)) > 0
                        OR instr(casefold(description), casefold(?1)) > 0
                        OR instr(casefold(content), casefold(?1)) > 0",
                );
                bind_values.push(Value::Text(search.to_string()));
            }
        }

        let direction = query.sort.as_sql();
        sql.push_str(&format!(" ORDER BY created_at {direction}, id {direction}"));

        let tx = self.conn.transaction()?;
        let pins = {
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(bind_values), parse_pin_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        tx.commit()?;

        Ok(pins)
    }

    fn get_pin_detail(&mut self, id: PinId) -> RepoResult<Option<PinDetail>> {
        let tx = self.conn.transaction()?;

        let pin = tx
            .query_row(
                &format!("SELECT {PIN_COLUMNS} FROM pins WHERE id = ?1;"),
                [id],
                parse_pin_row,
            )
            .optional()?;
        let Some(pin) = pin else {
            return Ok(None);
        };

        let comments = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {COMMENT_COLUMNS}
                 FROM comments
                 WHERE pin_id = ?1
                 ORDER BY created_at ASC, id ASC;"
            ))?;
            let rows = stmt.query_map([id], parse_comment_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        tx.commit()?;

        Ok(Some(PinDetail { pin, comments }))
    }

    fn create_pin(&mut self, pin: &NewPin) -> RepoResult<Pin> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let created = tx.query_row(
            &format!(
                "INSERT INTO pins (title, description, content, likes_count)
                 VALUES (?1, ?2, ?3, 0)
                 RETURNING {PIN_COLUMNS};"
            ),
            params![
                pin.title.as_deref(),
                pin.description.as_deref(),
                pin.content.as_str(),
            ],
            parse_pin_row,
        )?;
        tx.commit()?;

        Ok(created)
    }

    fn create_comment(&mut self, comment: &NewComment) -> RepoResult<Comment> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let created = tx
            .query_row(
                &format!(
                    "INSERT INTO comments (pin_id, username, content)
                     VALUES (?1, ?2, ?3)
                     RETURNING {COMMENT_COLUMNS};"
                ),
                params![
                    comment.pin_id,
                    comment.username.as_str(),
                    comment.content.as_str(),
                ],
                parse_comment_row,
            )
            .map_err(|err| missing_pin_or(err, comment.pin_id))?;
        tx.commit()?;

        Ok(created)
    }

    fn toggle_like(&mut self, pin_id: PinId, client: &ClientId) -> RepoResult<LikeState> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let already_liked: bool = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM likes WHERE pin_id = ?1 AND client_id = ?2
            );",
            params![pin_id, client.as_str()],
            |row| row.get(0),
        )?;

        let (liked, delta) = if already_liked {
            tx.execute(
                "DELETE FROM likes WHERE pin_id = ?1 AND client_id = ?2;",
                params![pin_id, client.as_str()],
            )?;
            (false, -1_i64)
        } else {
            tx.execute(
                "INSERT INTO likes (pin_id, client_id) VALUES (?1, ?2);",
                params![pin_id, client.as_str()],
            )
            .map_err(|err| missing_pin_or(err, pin_id))?;
            (true, 1_i64)
        };

        let likes_count: Option<i64> = tx
            .query_row(
                "UPDATE pins
                 SET likes_count = likes_count + ?2
                 WHERE id = ?1
                 RETURNING likes_count;",
                params![pin_id, delta],
                |row| row.get("likes_count"),
            )
            .optional()?;
        let Some(likes_count) = likes_count else {
            return Err(RepoError::NotFound(pin_id));
        };

        tx.commit()?;
        debug!(
            "event=like_toggle module=repo status=ok pin_id={} liked={} likes_count={}",
            pin_id, liked, likes_count
        );

        Ok(LikeState { liked, likes_count })
    }
}

fn parse_pin_row(row: &Row<'_>) -> rusqlite::Result<Pin> {
    Ok(Pin {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        likes_count: row.get("likes_count")?,
    })
}

fn parse_comment_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        pin_id: row.get("pin_id")?,
        username: row.get("username")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

/// Maps a foreign-key violation on `pin_id` to `NotFound`.
fn missing_pin_or(err: rusqlite::Error, pin_id: PinId) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepoError::NotFound(pin_id)
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::RepoError;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn uniqueness_and_busy_failures_are_conflicts() {
        for code in [
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            ffi::SQLITE_BUSY,
            ffi::SQLITE_LOCKED,
        ] {
            let err = RepoError::from(sqlite_failure(code));
            assert!(matches!(err, RepoError::Conflict(_)), "code {code}: {err}");
        }
    }

    #[test]
    fn check_failures_stay_store_errors() {
        let err = RepoError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_CHECK));
        assert!(matches!(err, RepoError::Db(_)));
    }

    #[test]
    fn foreign_key_failure_maps_to_not_found() {
        let err = super::missing_pin_or(sqlite_failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY), 7);
        assert!(matches!(err, RepoError::NotFound(7)));
    }
}
