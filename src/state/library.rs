use rusqlite::{params, Connection, ErrorCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::data::{Developer, GameEntry};

/// Errors raised by the catalogue database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create data directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The Library manages the SQLite catalogue database.
/// It stores developers and games, and keeps a single connection open
/// for the lifetime of the application.
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open the catalogue at `path`, creating the file and its parent
    /// directory if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        log::info!("Database opened at {}", path.display());

        let library = Library {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        library.init_schema()?;

        Ok(library)
    }

    /// Open a throwaway in-memory catalogue
    pub fn open_in_memory() -> StoreResult<Self> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Create the tables if they don't exist.
    /// Foreign keys are enforced per connection, so they are switched on here too.
    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS developers (
                id      INTEGER PRIMARY KEY,
                name    TEXT UNIQUE
            )",
            [],
        )?;

        // Games outlive their developer: the reference is cleared, not cascaded
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                id              INTEGER PRIMARY KEY,
                title           TEXT,
                image_path      TEXT,
                developer_id    INTEGER,
                FOREIGN KEY(developer_id) REFERENCES developers(id) ON DELETE SET NULL
            )",
            [],
        )?;

        log::debug!("Database schema initialized");

        Ok(())
    }

    /// Path to the database file, None for in-memory catalogues
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Add a developer.
    /// Returns the new ID, or None if a developer with this name already exists.
    pub fn add_developer(&self, name: &str) -> StoreResult<Option<i64>> {
        let result = self
            .conn
            .execute("INSERT INTO developers (name) VALUES (?1)", params![name]);

        match result {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                log::info!("Added developer {:?} (id {})", name, id);
                Ok(Some(id))
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                log::debug!("Developer {:?} already exists, skipping", name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a developer. Their games stay, with no developer.
    pub fn remove_developer(&self, developer_id: i64) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM developers WHERE id = ?1",
            params![developer_id],
        )?;
        log::info!("Removed developer {} ({} row)", developer_id, removed);
        Ok(())
    }

    /// All developers in storage order
    pub fn list_developers(&self) -> StoreResult<Vec<Developer>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM developers")?;

        let developer_iter = stmt.query_map([], |row| {
            Ok(Developer {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut developers = Vec::new();
        for developer in developer_iter {
            developers.push(developer?);
        }

        Ok(developers)
    }

    /// Add a game. Returns the new game ID.
    pub fn add_game(
        &self,
        title: &str,
        image_path: &str,
        developer_id: Option<i64>,
    ) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO games (title, image_path, developer_id) VALUES (?1, ?2, ?3)",
            params![title, image_path, developer_id],
        )?;

        let id = self.conn.last_insert_rowid();
        log::info!("Added game {:?} (id {})", title, id);
        Ok(id)
    }

    /// Delete a game by ID. Unknown IDs are ignored.
    pub fn remove_game(&self, game_id: i64) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM games WHERE id = ?1", params![game_id])?;
        log::info!("Removed game {} ({} row)", game_id, removed);
        Ok(())
    }

    /// All games with their developer's name.
    ///
    /// A non-blank `query` keeps only titles containing it. Matching follows
    /// SQLite `LIKE`: ASCII letters compare case-insensitively, and `%`, `_`
    /// and `\` in the query match themselves.
    pub fn list_games(&self, query: Option<&str>) -> StoreResult<Vec<GameEntry>> {
        let filter = query.map(str::trim).filter(|q| !q.is_empty());

        let mut sql = String::from(
            "SELECT games.id, games.title, games.image_path, developers.name
             FROM games
             LEFT JOIN developers ON games.developer_id = developers.id",
        );
        if filter.is_some() {
            sql.push_str(" WHERE games.title LIKE ?1 ESCAPE '\\'");
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(GameEntry {
                id: row.get(0)?,
                title: row.get(1)?,
                image_path: row.get(2)?,
                developer_name: row.get(3)?,
            })
        };

        let game_iter = match filter {
            Some(q) => stmt.query_map(params![like_pattern(q)], map_row)?,
            None => stmt.query_map([], map_row)?,
        };

        let mut games = Vec::new();
        for game in game_iter {
            games.push(game?);
        }

        Ok(games)
    }

    /// Get a count of games in the catalogue
    pub fn game_count(&self) -> StoreResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get a count of developers in the catalogue
    pub fn developer_count(&self) -> StoreResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM developers", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Build a match-anywhere LIKE pattern with wildcards escaped
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
