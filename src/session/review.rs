// src/session/review.rs

use chrono::{DateTime, TimeZone};
use log::{debug, info};
use rand::Rng;

use super::{persist_then_apply, SessionError};
use crate::debug::Tracer;
use crate::scheduler::{Judgment, Preview, Scheduler};
use crate::selection::{self, GroupFilter, Presentation};
use crate::stats::{self, Summary};
use crate::storage::{JournalEvent, ReviewJournal, WordRepository};
use crate::words::Word;

/// Contains the state of one scheduled-review sitting for a single owner.
pub struct ReviewSession<'a, R: WordRepository + ?Sized, S: Scheduler> {
    owner_id: String,
    repo: &'a R,
    scheduler: S,
    journal: Option<ReviewJournal>,
    group: GroupFilter,
    words: Vec<Word>,
    current: Option<Presentation>,
    reviews_complete: usize,
}

impl<'a, R: WordRepository + ?Sized, S: Scheduler> ReviewSession<'a, R, S> {
    pub fn new(owner_id: &str, repo: &'a R, scheduler: S) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            repo,
            scheduler,
            journal: None,
            group: GroupFilter::All,
            words: Vec::new(),
            current: None,
            reviews_complete: 0,
        }
    }

    pub fn with_journal(mut self, journal: ReviewJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Limits the due queue to one group.
    pub fn with_group(mut self, group: GroupFilter) -> Self {
        self.group = group;
        self
    }

    /// Replaces the local cache with the repository's current word set.
    pub fn load(&mut self) -> Result<(), SessionError> {
        #[cfg(debug_assertions)]
        let _tracer = Tracer::new("Load review words");
        self.words = self.repo.list(&self.owner_id)?;
        self.current = None;
        info!("Review session loaded {} words for {}.", self.words.len(), self.owner_id);
        Ok(())
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn current(&self) -> Option<&Presentation> {
        self.current.as_ref()
    }

    /// Due dates the presented word would get for each judgment.
    pub fn preview<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Preview, SessionError> {
        let presented = self.current.as_ref().ok_or(SessionError::NoCurrentWord)?;
        Ok(self.scheduler.preview(&presented.word, now)?)
    }

    pub fn reviews_complete(&self) -> usize {
        self.reviews_complete
    }

    pub fn due_count<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> usize {
        selection::due_words(&self.words, &self.group, now).len()
    }

    pub fn summary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Summary {
        stats::summarize(&self.words, now)
    }

    /// Draws the next due word from the cache. `None` means the session is complete.
    pub fn next<Rn: Rng + ?Sized, Tz: TimeZone>(&mut self, rng: &mut Rn, now: &DateTime<Tz>) -> Option<&Presentation> {
        self.current = selection::pick_due(&self.words, &self.group, rng, now);
        if self.current.is_none() {
            info!("No words due for {}; review complete.", self.owner_id);
        }
        self.current.as_ref()
    }

    /// Records a judgment for the presented word. The new record is saved
    /// first and only then applied locally; on a storage error nothing
    /// changes and the same judgment can be submitted again.
    pub fn answer<Tz: TimeZone>(&mut self, judgment: Judgment, now: &DateTime<Tz>) -> Result<Word, SessionError> {
        let presented = self.current.as_ref().ok_or(SessionError::NoCurrentWord)?;
        let before = self
            .words
            .iter()
            .find(|w| w.id == presented.word.id)
            .cloned()
            .unwrap_or_else(|| presented.word.clone());

        let progress = self.scheduler.judge(&before, judgment, now)?;
        let after = persist_then_apply(
            self.repo,
            &self.owner_id,
            &mut self.words,
            self.journal.as_ref(),
            &before,
            before.with_progress(progress),
            JournalEvent::Judged(judgment),
        )?;

        debug!(
            "Word {} judged {:?}: stage {} -> {}, reviews {}",
            after.id, judgment, before.stage, after.stage, after.review_count
        );
        self.current = None;
        self.reviews_complete += 1;
        Ok(after)
    }
}
