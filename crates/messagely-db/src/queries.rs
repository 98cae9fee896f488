use crate::Database;
use crate::models::{MessageRow, NewUser, PartyMessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>, join_at: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, first_name, last_name, phone, join_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (user.username, user.first_name, user.last_name, user.phone, join_at),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, username))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, first_name, last_name, phone, join_at, last_login_at
                 FROM users
                 ORDER BY username",
            )?;

            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Moves `last_login_at` forward to `at`. Returns false when the stored
    /// value is already at or after `at`, or the user does not exist.
    pub fn touch_last_login(&self, username: &str, at: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET last_login_at = ?2
                 WHERE username = ?1 AND (last_login_at IS NULL OR last_login_at < ?2)",
                (username, at),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        from_username: &str,
        to_username: &str,
        body: &str,
        sent_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, from_username, to_username, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, from_username, to_username, body, sent_at],
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Sets `read_at` if it is still unset, never earlier than `sent_at`.
    ///
    /// Update and re-read happen under the writer lock, so concurrent callers
    /// see exactly one write. Returns the current row and whether this call
    /// performed the write, or `None` if the message does not exist.
    pub fn mark_read(&self, id: &str, read_at: &str) -> Result<Option<(MessageRow, bool)>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET read_at = MAX(?2, sent_at)
                 WHERE id = ?1 AND read_at IS NULL",
                (id, read_at),
            )?;

            Ok(query_message(conn, id)?.map(|row| (row, changed > 0)))
        })
    }

    /// Messages received by `username`, oldest first, joined with the sender.
    pub fn messages_to(&self, username: &str) -> Result<Vec<PartyMessageRow>> {
        self.with_conn(|conn| {
            query_party_messages(
                conn,
                "SELECT m.id, m.body, m.sent_at, m.read_at,
                        u.username, u.first_name, u.last_name, u.phone
                 FROM messages m
                 JOIN users u ON m.from_username = u.username
                 WHERE m.to_username = ?1
                 ORDER BY m.sent_at ASC, m.rowid ASC",
                username,
            )
        })
    }

    /// Messages sent by `username`, oldest first, joined with the recipient.
    pub fn messages_from(&self, username: &str) -> Result<Vec<PartyMessageRow>> {
        self.with_conn(|conn| {
            query_party_messages(
                conn,
                "SELECT m.id, m.body, m.sent_at, m.read_at,
                        u.username, u.first_name, u.last_name, u.phone
                 FROM messages m
                 JOIN users u ON m.to_username = u.username
                 WHERE m.from_username = ?1
                 ORDER BY m.sent_at ASC, m.rowid ASC",
                username,
            )
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        username: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        join_at: row.get(4)?,
        last_login_at: row.get(5)?,
    })
}

fn query_user(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT username, first_name, last_name, phone, join_at, last_login_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], user_from_row).optional()?;

    Ok(row)
}

fn query_message(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, from_username, to_username, body, sent_at, read_at
         FROM messages WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                from_username: row.get(1)?,
                to_username: row.get(2)?,
                body: row.get(3)?,
                sent_at: row.get(4)?,
                read_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_party_messages(
    conn: &Connection,
    sql: &str,
    username: &str,
) -> Result<Vec<PartyMessageRow>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map([username], |row| {
            Ok(PartyMessageRow {
                id: row.get(0)?,
                body: row.get(1)?,
                sent_at: row.get(2)?,
                read_at: row.get(3)?,
                party_username: row.get(4)?,
                party_first_name: row.get(5)?,
                party_last_name: row.get(6)?,
                party_phone: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
