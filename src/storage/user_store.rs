//! Data-access operations for user accounts.

use crate::storage::database::DatabaseError;
use crate::storage::types::User;
use rusqlite::{params, Connection, Row};

/// Store for reading and writing user rows over a borrowed connection.
pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    /// Create a new user store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a user and return the generated row id.
    pub fn insert(&self, user: &User) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO usertable (username, password, is_admin) VALUES (?1, ?2, ?3)",
                params![user.username, user.password, user.is_admin],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Insert one or more users.
    pub fn insert_many(&self, users: &[User]) -> Result<(), DatabaseError> {
        for user in users {
            self.insert(user)?;
        }
        Ok(())
    }

    /// Delete all users and return the number of rows removed.
    pub fn delete_all(&self) -> Result<usize, DatabaseError> {
        self.conn
            .execute("DELETE FROM usertable", [])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    /// Look up a user by username. `Ok(None)` when no row matches.
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, username, password, is_admin FROM usertable WHERE username = ?1",
            params![username],
            map_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Look up a user by row id. `Ok(None)` when no row matches.
    pub fn get_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, username, password, is_admin FROM usertable WHERE id = ?1",
            params![id],
            map_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Count users in the database.
    pub fn count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM usertable", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

fn map_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        is_admin: row.get(3)?,
    })
}
