// src/words/import.rs
// Batch import of words from a JSON array.

use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::NewWord;
use crate::storage::WordRepository;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of words")]
    NotAnArray,
}

/// One entry of an import file. Older exports name the text fields
/// `japanese` and `chinese`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportEntry {
    #[serde(default, alias = "japanese")]
    front: Option<String>,
    #[serde(default, alias = "chinese")]
    back: Option<String>,
    #[serde(default)]
    pronunciation: Option<String>,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    group_id: Option<String>,
}

/// Entries that parsed into valid words, plus a count of those that did not.
#[derive(Debug, Default)]
pub struct Batch {
    pub words: Vec<NewWord>,
    pub rejected: usize,
}

/// Outcome of an import: how many words were stored and how many failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub success: usize,
    pub error: usize,
}

/// Parses a JSON array into fresh words. Entries lacking either text field
/// are counted as rejected rather than failing the whole batch.
pub fn parse_batch(json: &str, now_ms: i64) -> Result<Batch, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let mut batch = Batch::default();
    for item in items {
        let entry = match serde_json::from_value::<ImportEntry>(item) {
            Ok(entry) => entry,
            Err(_) => {
                batch.rejected += 1;
                continue;
            }
        };
        let front = entry.front.unwrap_or_default();
        let back = entry.back.unwrap_or_default();
        match NewWord::fresh(&front, &back, now_ms) {
            Ok(word) => batch.words.push(
                word.with_pronunciation(entry.pronunciation.as_deref())
                    .with_example(entry.example.as_deref())
                    .with_group(entry.group_id.as_deref()),
            ),
            Err(_) => batch.rejected += 1,
        }
    }
    Ok(batch)
}

/// Stores every valid entry of `json` for `owner_id`. Individual repository
/// failures are counted, not propagated, so one bad write does not abort the batch.
pub fn import_batch<R: WordRepository + ?Sized>(
    repo: &R,
    owner_id: &str,
    json: &str,
    now_ms: i64,
) -> Result<ImportReport, ImportError> {
    let batch = parse_batch(json, now_ms)?;
    let mut report = ImportReport { success: 0, error: batch.rejected };
    for word in batch.words {
        match repo.create(owner_id, word) {
            Ok(_) => report.success += 1,
            Err(e) => {
                warn!("Failed to import word: {}", e);
                report.error += 1;
            }
        }
    }
    info!("Imported {} words ({} failed).", report.success, report.error);
    Ok(report)
}

/// Reads an import file from disk and stores its words.
pub fn import_file<R: WordRepository + ?Sized>(
    repo: &R,
    owner_id: &str,
    path: &Path,
    now_ms: i64,
) -> Result<ImportReport, ImportError> {
    let json = fs::read_to_string(path)?;
    import_batch(repo, owner_id, &json, now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    #[test]
    fn test_parse_batch_counts_invalid_entries() {
        let json = r#"[
            {"front": "犬", "back": "dog", "pronunciation": " inu "},
            {"japanese": "猫", "chinese": "猫咪", "groupId": "animals"},
            {"front": "", "back": "nothing"},
            {"back": "orphan"},
            42
        ]"#;
        let batch = parse_batch(json, 7).unwrap();
        assert_eq!(batch.words.len(), 2);
        assert_eq!(batch.rejected, 3);
        assert_eq!(batch.words[0].pronunciation.as_deref(), Some("inu"));
        assert_eq!(batch.words[1].front, "猫");
        assert_eq!(batch.words[1].group_id.as_deref(), Some("animals"));
        assert!(batch.words.iter().all(|w| w.stage == 0 && w.next_review_date == 7));
    }

    #[test]
    fn test_parse_batch_requires_array() {
        assert!(matches!(parse_batch(r#"{"front": "a"}"#, 0), Err(ImportError::NotAnArray)));
        assert!(matches!(parse_batch("not json", 0), Err(ImportError::Json(_))));
    }

    #[test]
    fn test_import_batch_stores_valid_words() {
        let store = SqliteStore::open_in_memory().unwrap();
        let json = r#"[{"front": "a", "back": "b"}, {"front": "c"}]"#;
        let report = import_batch(&store, "alice", json, 100).unwrap();
        assert_eq!(report, ImportReport { success: 1, error: 1 });
        assert_eq!(store.list("alice").unwrap().len(), 1);
        assert!(store.list("bob").unwrap().is_empty());
    }
}
