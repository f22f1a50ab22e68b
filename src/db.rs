use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// One independently persisted piece of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    SavedJobs,
    Applications,
    User,
    Resume,
}

impl Slice {
    pub const ALL: [Slice; 4] = [Slice::SavedJobs, Slice::Applications, Slice::User, Slice::Resume];

    pub fn key(&self) -> &'static str {
        match self {
            Slice::SavedJobs => "savedJobs",
            Slice::Applications => "applications",
            Slice::User => "user",
            Slice::Resume => "resume",
        }
    }
}

/// Durable key/value storage for the persisted slices. Values are JSON documents.
pub trait SliceStore {
    fn read(&self, slice: Slice) -> Result<Option<String>>;
    fn write(&self, slice: Slice, json: &str) -> Result<()>;
}

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.init()?;
        Ok(db)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobhunt") {
            proj_dirs.data_dir().join("jobhunt.db")
        } else {
            PathBuf::from("jobhunt.db")
        }
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slices (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    /// Removes every persisted slice. The next load starts from defaults.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM slices", [])?;
        Ok(removed)
    }

    pub fn slice_updated_at(&self, slice: Slice) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT updated_at FROM slices WHERE key = ?1",
                [slice.key()],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read slice timestamp")
    }
}

impl SliceStore for Database {
    fn read(&self, slice: Slice) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM slices WHERE key = ?1",
                [slice.key()],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read slice '{}'", slice.key()))
    }

    fn write(&self, slice: Slice, json: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO slices (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![slice.key(), json],
            )
            .with_context(|| format!("Failed to write slice '{}'", slice.key()))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory slice store that counts writes per slice.
    #[derive(Default)]
    pub struct MemoryStore {
        values: RefCell<HashMap<Slice, String>>,
        writes: RefCell<HashMap<Slice, usize>>,
    }

    impl MemoryStore {
        pub fn with(slice: Slice, json: &str) -> Self {
            let store = Self::default();
            store.values.borrow_mut().insert(slice, json.to_string());
            store
        }

        pub fn writes(&self, slice: Slice) -> usize {
            self.writes.borrow().get(&slice).copied().unwrap_or(0)
        }

        pub fn value(&self, slice: Slice) -> Option<String> {
            self.values.borrow().get(&slice).cloned()
        }
    }

    impl SliceStore for MemoryStore {
        fn read(&self, slice: Slice) -> Result<Option<String>> {
            Ok(self.value(slice))
        }

        fn write(&self, slice: Slice, json: &str) -> Result<()> {
            self.values.borrow_mut().insert(slice, json.to_string());
            *self.writes.borrow_mut().entry(slice).or_insert(0) += 1;
            Ok(())
        }
    }
}
