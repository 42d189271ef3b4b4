// src/storage/db.rs
// Manages the SQLite database holding words and groups.

use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use super::{GroupRepository, Result, StorageError, WordRepository};
use crate::words::{Group, NewWord, Word, WordPatch, DEFAULT_GROUP_ID};

const WORD_COLUMNS: &str = "id, front, back, pronunciation, example, group_id, stage, \
                            review_count, correct_count, next_review_date, created_at";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = SqliteStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates the necessary tables if they don't already exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS words (
                id                  TEXT PRIMARY KEY,
                owner_id            TEXT NOT NULL,
                front               TEXT NOT NULL,
                back                TEXT NOT NULL,
                pronunciation       TEXT,
                example             TEXT,
                group_id            TEXT,
                stage               INTEGER NOT NULL,
                review_count        INTEGER NOT NULL,
                correct_count       INTEGER NOT NULL,
                next_review_date    INTEGER NOT NULL,
                created_at          INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS words_owner ON words (owner_id);
            CREATE TABLE IF NOT EXISTS word_groups (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL,
                name        TEXT NOT NULL,
                sort_order  INTEGER NOT NULL,
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER
            );
            CREATE INDEX IF NOT EXISTS word_groups_owner ON word_groups (owner_id);",
        )?;
        Ok(())
    }

    fn word_from_row(row: &Row) -> rusqlite::Result<Word> {
        Ok(Word {
            id: row.get(0)?,
            front: row.get(1)?,
            back: row.get(2)?,
            pronunciation: row.get(3)?,
            example: row.get(4)?,
            group_id: row.get(5)?,
            stage: row.get(6)?,
            review_count: row.get(7)?,
            correct_count: row.get(8)?,
            next_review_date: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn find_word(&self, owner_id: &str, id: &str) -> Result<Option<Word>> {
        let sql = format!("SELECT {} FROM words WHERE owner_id = ?1 AND id = ?2", WORD_COLUMNS);
        let word = self
            .conn
            .query_row(&sql, params![owner_id, id], Self::word_from_row)
            .optional()?;
        Ok(word)
    }
}

impl WordRepository for SqliteStore {
    fn list(&self, owner_id: &str) -> Result<Vec<Word>> {
        let sql = format!(
            "SELECT {} FROM words WHERE owner_id = ?1 ORDER BY created_at DESC, id",
            WORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let words = stmt
            .query_map(params![owner_id], Self::word_from_row)?
            .collect::<rusqlite::Result<Vec<Word>>>()?;
        debug!("Loaded {} words for {}.", words.len(), owner_id);
        Ok(words)
    }

    fn create(&self, owner_id: &str, word: NewWord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO words (id, owner_id, front, back, pronunciation, example, group_id,
                                stage, review_count, correct_count, next_review_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                id,
                owner_id,
                word.front,
                word.back,
                word.pronunciation,
                word.example,
                word.group_id,
                word.stage,
                word.review_count,
                word.correct_count,
                word.next_review_date,
                word.created_at,
            ],
        )?;
        Ok(id)
    }

    /// Applies the patch to the stored row inside one transaction.
    fn update(&self, owner_id: &str, id: &str, patch: &WordPatch) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let mut word = self
            .find_word(owner_id, id)?
            .ok_or_else(|| StorageError::WordNotFound(id.to_string()))?;
        patch.apply(&mut word);
        tx.execute(
            "UPDATE words SET front = ?3, back = ?4, pronunciation = ?5, example = ?6, group_id = ?7,
                              stage = ?8, review_count = ?9, correct_count = ?10, next_review_date = ?11
             WHERE owner_id = ?1 AND id = ?2",
            params![
                owner_id,
                id,
                word.front,
                word.back,
                word.pronunciation,
                word.example,
                word.group_id,
                word.stage,
                word.review_count,
                word.correct_count,
                word.next_review_date,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM words WHERE owner_id = ?1 AND id = ?2", params![owner_id, id])?;
        if removed == 0 {
            return Err(StorageError::WordNotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_one(&self, owner_id: &str, id: &str) -> Result<Word> {
        self.find_word(owner_id, id)?
            .ok_or_else(|| StorageError::WordNotFound(id.to_string()))
    }
}

impl GroupRepository for SqliteStore {
    fn list_groups(&self, owner_id: &str) -> Result<Vec<Group>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, sort_order, created_at FROM word_groups
             WHERE owner_id = ?1 ORDER BY sort_order, created_at",
        )?;
        let groups = stmt
            .query_map(params![owner_id], |row| {
                Ok(Group {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    order: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Group>>>()?;
        Ok(groups)
    }

    /// New groups go after the existing ones; position 0 belongs to the default group.
    fn create_group(&self, owner_id: &str, name: &str, now_ms: i64) -> Result<Group> {
        let existing: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM word_groups WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            order: existing + 1,
            created_at: now_ms,
        };
        self.conn.execute(
            "INSERT INTO word_groups (id, owner_id, name, sort_order, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![group.id, owner_id, group.name, group.order, group.created_at],
        )?;
        Ok(group)
    }

    fn rename_group(&self, owner_id: &str, id: &str, name: &str) -> Result<()> {
        if id == DEFAULT_GROUP_ID {
            return Err(StorageError::DefaultGroup);
        }
        let updated = self.conn.execute(
            "UPDATE word_groups SET name = ?3, updated_at = ?4 WHERE owner_id = ?1 AND id = ?2",
            params![owner_id, id, name.trim(), chrono::Utc::now().timestamp_millis()],
        )?;
        if updated == 0 {
            return Err(StorageError::GroupNotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::NEVER;

    fn store_with_word() -> (SqliteStore, String) {
        let store = SqliteStore::open_in_memory().unwrap();
        let new = NewWord::fresh("猫", "cat", 1_000).unwrap().with_pronunciation(Some("neko"));
        let id = store.create("alice", new).unwrap();
        (store, id)
    }

    #[test]
    fn test_create_and_get_one() {
        let (store, id) = store_with_word();
        let word = store.get_one("alice", &id).unwrap();
        assert_eq!(word.id, id);
        assert_eq!(word.front, "猫");
        assert_eq!(word.pronunciation.as_deref(), Some("neko"));
        assert_eq!(word.stage, 0);
        assert_eq!(word.next_review_date, 1_000);
    }

    #[test]
    fn test_words_are_scoped_by_owner() {
        let (store, id) = store_with_word();
        assert!(store.list("bob").unwrap().is_empty());
        assert!(matches!(store.get_one("bob", &id), Err(StorageError::WordNotFound(_))));
        assert!(matches!(store.delete("bob", &id), Err(StorageError::WordNotFound(_))));
        assert_eq!(store.list("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_update_applies_partial_fields() {
        let (store, id) = store_with_word();
        let patch = WordPatch { stage: Some(7), review_count: Some(9), next_review_date: Some(NEVER), ..WordPatch::default() };
        store.update("alice", &id, &patch).unwrap();

        let word = store.get_one("alice", &id).unwrap();
        assert_eq!(word.stage, 7);
        assert_eq!(word.review_count, 9);
        assert_eq!(word.correct_count, 0);
        assert_eq!(word.next_review_date, NEVER);
        assert_eq!(word.front, "猫");
    }

    #[test]
    fn test_update_missing_word() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.update("alice", "nope", &WordPatch::default());
        assert!(matches!(result, Err(StorageError::WordNotFound(_))));
    }

    #[test]
    fn test_delete() {
        let (store, id) = store_with_word();
        store.delete("alice", &id).unwrap();
        assert!(store.list("alice").unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create("alice", NewWord::fresh("old", "x", 1).unwrap()).unwrap();
        store.create("alice", NewWord::fresh("new", "y", 2).unwrap()).unwrap();
        let fronts: Vec<String> = store.list("alice").unwrap().into_iter().map(|w| w.front).collect();
        assert_eq!(fronts, vec!["new", "old"]);
    }

    #[test]
    fn test_groups_are_ordered_and_renamable() {
        let store = SqliteStore::open_in_memory().unwrap();
        let verbs = store.create_group("alice", "Verbs", 10).unwrap();
        let nouns = store.create_group("alice", " Nouns ", 20).unwrap();
        assert_eq!(verbs.order, 1);
        assert_eq!(nouns.order, 2);
        assert_eq!(nouns.name, "Nouns");

        store.rename_group("alice", &verbs.id, "Doing words").unwrap();
        let groups = store.list_groups("alice").unwrap();
        assert_eq!(groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(), vec!["Doing words", "Nouns"]);
        assert!(store.list_groups("bob").unwrap().is_empty());
    }

    #[test]
    fn test_default_group_is_not_stored() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(store.rename_group("alice", "default", "x"), Err(StorageError::DefaultGroup)));
        assert!(matches!(store.rename_group("alice", "missing", "x"), Err(StorageError::GroupNotFound(_))));
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("words.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.create("alice", NewWord::fresh("a", "b", 0).unwrap()).unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.list("alice").unwrap().len(), 1);
    }
}
