// src/session/mod.rs
// Caller-side drivers that connect the scheduler to the repository.
//
// The local word cache is only changed after the repository accepted the
// write, so a failed write can be retried without counting a review twice.

pub mod practice;
pub mod review;

use log::warn;
use thiserror::Error;

use crate::debug::{Tracer, SLOW_WRITE};
use crate::scheduler::SchedulerError;
use crate::storage::{JournalEvent, ReviewJournal, StorageError, WordRepository};
use crate::words::{Word, WordPatch};

pub use self::practice::PracticeSession;
pub use self::review::ReviewSession;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no word is currently presented")]
    NoCurrentWord,
}

/// Writes the scheduling fields of `after` through the repository, then
/// swaps it into `cache` and journals the change.
fn persist_then_apply<R: WordRepository + ?Sized>(
    repo: &R,
    owner_id: &str,
    cache: &mut [Word],
    journal: Option<&ReviewJournal>,
    before: &Word,
    after: Word,
    event: JournalEvent,
) -> Result<Word, SessionError> {
    let patch = WordPatch::from(after.progress());
    let written = {
        let _tracer = Tracer::with_slow_threshold("Save word progress", SLOW_WRITE);
        repo.update(owner_id, &after.id, &patch)
    };
    if let Err(e) = written {
        warn!("Failed to save progress for word {}: {}", after.id, e);
        return Err(e.into());
    }

    if let Some(slot) = cache.iter_mut().find(|w| w.id == after.id) {
        *slot = after.clone();
    }
    if let Some(journal) = journal {
        if let Err(e) = journal.record(before, &after, event) {
            warn!("Failed to write review journal: {}", e);
        }
    }
    Ok(after)
}
