// src/storage/mod.rs
// This module handles all data persistence: the word/group repositories and the review journal.

pub mod db;
pub mod journal;

use thiserror::Error;

use crate::words::{Group, NewWord, Word, WordPatch};

// Re-export the main structs for easier access.
pub use self::db::SqliteStore;
pub use self::journal::{JournalEvent, ReviewJournal};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("word not found: {0}")]
    WordNotFound(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("the default group is virtual and cannot be stored")]
    DefaultGroup,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persists word records per owner. The scheduler never calls this; the
/// session layer reads through it and writes computed records back.
pub trait WordRepository {
    fn list(&self, owner_id: &str) -> Result<Vec<Word>>;
    /// Stores a new word and returns the id assigned to it.
    fn create(&self, owner_id: &str, word: NewWord) -> Result<String>;
    fn update(&self, owner_id: &str, id: &str, patch: &WordPatch) -> Result<()>;
    fn delete(&self, owner_id: &str, id: &str) -> Result<()>;
    fn get_one(&self, owner_id: &str, id: &str) -> Result<Word>;
}

/// Persists user-defined groups. The synthetic default group is never stored.
pub trait GroupRepository {
    /// Stored groups ordered by `order`.
    fn list_groups(&self, owner_id: &str) -> Result<Vec<Group>>;
    fn create_group(&self, owner_id: &str, name: &str, now_ms: i64) -> Result<Group>;
    fn rename_group(&self, owner_id: &str, id: &str, name: &str) -> Result<()>;
}
