// src/storage/journal.rs
// Append-only text journal of every stage change, kept for recovery.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::scheduler::Judgment;
use crate::words::Word;

/// What happened to a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEvent {
    Judged(Judgment),
    Reset,
}

impl fmt::Display for JournalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalEvent::Judged(Judgment::Remembered) => write!(f, "remembered"),
            JournalEvent::Judged(Judgment::Forgotten) => write!(f, "forgotten"),
            JournalEvent::Reset => write!(f, "reset"),
        }
    }
}

pub struct ReviewJournal {
    log_path: PathBuf,
}

impl ReviewJournal {
    /// Creates a journal for one owner inside `dir`.
    pub fn new(dir: &Path, owner_id: &str) -> Result<Self, std::io::Error> {
        fs::create_dir_all(dir)?;
        let file_name: String = owner_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Ok(ReviewJournal { log_path: dir.join(format!("{}.log", file_name)) })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Appends one line. Format: timestamp_iso,word_id,event,old_stage,new_stage,next_review_date
    pub fn record(&self, before: &Word, after: &Word, event: JournalEvent) -> Result<(), std::io::Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        let timestamp = chrono::Utc::now().to_rfc3339();
        let entry = format!(
            "{},{},{},{},{},{}\n",
            timestamp, after.id, event, before.stage, after.stage, after.next_review_date
        );
        file.write_all(entry.as_bytes())?;
        Ok(())
    }
}
