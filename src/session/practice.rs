// src/session/practice.rs

use chrono::{DateTime, TimeZone};
use log::info;
use rand::Rng;

use super::{persist_then_apply, SessionError};
use crate::scheduler::Scheduler;
use crate::selection::{self, PracticeFilter, Presentation};
use crate::storage::{JournalEvent, ReviewJournal, WordRepository};
use crate::words::Word;

/// Unscheduled drilling over a user-chosen slice of the word set.
/// Drawing words here never touches review counts or due dates.
pub struct PracticeSession<'a, R: WordRepository + ?Sized, S: Scheduler> {
    owner_id: String,
    repo: &'a R,
    scheduler: S,
    journal: Option<ReviewJournal>,
    filter: PracticeFilter,
    words: Vec<Word>,
    current: Option<Presentation>,
}

impl<'a, R: WordRepository + ?Sized, S: Scheduler> PracticeSession<'a, R, S> {
    pub fn new(owner_id: &str, repo: &'a R, scheduler: S, filter: PracticeFilter) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            repo,
            scheduler,
            journal: None,
            filter,
            words: Vec::new(),
            current: None,
        }
    }

    pub fn with_journal(mut self, journal: ReviewJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn load(&mut self) -> Result<(), SessionError> {
        self.words = self.repo.list(&self.owner_id)?;
        self.current = None;
        info!("Practice session loaded {} words for {}.", self.words.len(), self.owner_id);
        Ok(())
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn filter(&self) -> &PracticeFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: PracticeFilter) {
        self.filter = filter;
        self.current = None;
    }

    pub fn current(&self) -> Option<&Presentation> {
        self.current.as_ref()
    }

    pub fn pool_size(&self) -> usize {
        selection::practice_words(&self.words, &self.filter).len()
    }

    /// Draws a random word matching the filter, or `None` if nothing matches.
    pub fn next<Rn: Rng + ?Sized>(&mut self, rng: &mut Rn) -> Option<&Presentation> {
        self.current = selection::pick_practice(&self.words, &self.filter, rng);
        self.current.as_ref()
    }

    /// Sends the presented word back to stage 0.
    pub fn reset_current<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<Word, SessionError> {
        let id = self
            .current
            .as_ref()
            .map(|p| p.word.id.clone())
            .ok_or(SessionError::NoCurrentWord)?;
        let word = self.reset(&id, now)?;
        if let Some(current) = self.current.as_mut() {
            current.word = word.clone();
        }
        Ok(word)
    }

    /// Sends any cached word back to stage 0, due now, with its counts kept.
    pub fn reset<Tz: TimeZone>(&mut self, id: &str, now: &DateTime<Tz>) -> Result<Word, SessionError> {
        let before = match self.words.iter().find(|w| w.id == id) {
            Some(word) => word.clone(),
            None => self.repo.get_one(&self.owner_id, id)?,
        };
        let progress = self.scheduler.reset(&before, now);
        let after = persist_then_apply(
            self.repo,
            &self.owner_id,
            &mut self.words,
            self.journal.as_ref(),
            &before,
            before.with_progress(progress),
            JournalEvent::Reset,
        )?;
        info!("Word {} reset from stage {}.", after.id, before.stage);
        Ok(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::LadderScheduler;
    use crate::selection::{is_due, StageFilter};
    use crate::session::tests::FlakyStore;
    use crate::storage::{SqliteStore, StorageError};
    use crate::words::{NewWord, WordPatch};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn seed_at_stage(repo: &dyn WordRepository, front: &str, stage: u8) -> String {
        let id = repo.create("alice", NewWord::fresh(front, "x", 0).unwrap()).unwrap();
        let patch = WordPatch {
            stage: Some(stage),
            review_count: Some(20),
            correct_count: Some(15),
            next_review_date: Some(i64::MAX - 1),
            ..WordPatch::default()
        };
        repo.update("alice", &id, &patch).unwrap();
        id
    }

    #[test]
    fn test_practice_draws_from_stage_range() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed_at_stage(&store, "low", 1);
        let high = seed_at_stage(&store, "high", 5);
        let filter = PracticeFilter { stages: StageFilter::range(4, 6), ..PracticeFilter::default() };
        let mut session = PracticeSession::new("alice", &store, LadderScheduler::default(), filter);
        session.load().unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        assert_eq!(session.pool_size(), 1);
        for _ in 0..10 {
            assert_eq!(session.next(&mut rng).unwrap().word.id, high);
        }

        session.set_filter(PracticeFilter { stages: StageFilter::set([3]), ..PracticeFilter::default() });
        assert!(session.next(&mut rng).is_none());
    }

    #[test]
    fn test_reset_keeps_counts_and_makes_word_due() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = seed_at_stage(&store, "a", 5);
        let mut session = PracticeSession::new("alice", &store, LadderScheduler::default(), PracticeFilter::default());
        session.load().unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        session.next(&mut rng).unwrap();

        let word = session.reset_current(&now()).unwrap();
        assert_eq!((word.stage, word.review_count, word.correct_count), (0, 20, 15));
        assert_eq!(word.next_review_date, now().timestamp_millis());
        assert!(is_due(&word, &now()));
        assert_eq!(store.get_one("alice", &id).unwrap(), word);
        assert_eq!(session.current().unwrap().word.stage, 0);
    }

    #[test]
    fn test_reset_unknown_word() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut session = PracticeSession::new("alice", &store, LadderScheduler::default(), PracticeFilter::default());
        session.load().unwrap();
        assert!(matches!(
            session.reset("missing", &now()),
            Err(SessionError::Storage(StorageError::WordNotFound(_)))
        ));
        assert!(matches!(session.reset_current(&now()), Err(SessionError::NoCurrentWord)));
    }

    #[test]
    fn test_failed_reset_leaves_cache_untouched() {
        let store = FlakyStore::new();
        let id = seed_at_stage(&store, "a", 4);
        let mut session = PracticeSession::new("alice", &store, LadderScheduler::default(), PracticeFilter::default());
        session.load().unwrap();

        store.failing.set(true);
        assert!(session.reset(&id, &now()).is_err());
        assert_eq!(session.words()[0].stage, 4);
    }
}
