// src/scheduler.rs
// Contains the logic for the spaced repetition system.

use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::clock::{self, NEVER};
use crate::words::{Progress, Word, COMPLETED_STAGE, LAST_SCHEDULED_STAGE};

/// Review intervals in days, indexed by stage 0..=6.
pub const DEFAULT_INTERVALS: [u32; 7] = [1, 2, 4, 7, 15, 30, 60];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("stage {0} cannot be scheduled (expected 0..={})", LAST_SCHEDULED_STAGE)]
    InvalidStage(u8),

    #[error("invalid interval table: {0}")]
    InvalidIntervals(String),
}

/// Represents the user's judgment of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgment {
    Remembered,
    Forgotten,
}

impl Judgment {
    pub fn remembered(self) -> bool {
        self == Judgment::Remembered
    }
}

impl From<bool> for Judgment {
    fn from(remembered: bool) -> Self {
        if remembered {
            Judgment::Remembered
        } else {
            Judgment::Forgotten
        }
    }
}

/// A validated interval table: one strictly increasing, non-zero day count per scheduled stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals([u32; 7]);

impl Intervals {
    pub fn new(days: &[u32]) -> Result<Self, SchedulerError> {
        let table: [u32; 7] = days.try_into().map_err(|_| {
            SchedulerError::InvalidIntervals(format!("expected 7 entries, got {}", days.len()))
        })?;
        if table[0] == 0 {
            return Err(SchedulerError::InvalidIntervals("the first interval must be at least one day".into()));
        }
        if let Some(pair) = table.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SchedulerError::InvalidIntervals(format!(
                "intervals must strictly increase ({} is followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self(table))
    }

    /// Days until the next review for a word sitting at `stage`.
    pub fn days(&self, stage: u8) -> u32 {
        self.0[usize::from(stage.min(LAST_SCHEDULED_STAGE))]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self(DEFAULT_INTERVALS)
    }
}

/// Due dates each judgment would produce, for display before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    pub remembered: i64,
    pub forgotten: i64,
}

/// A trait defining the core behavior of any scheduling algorithm.
///
/// Implementations are pure: the same word, judgment and instant always
/// yield the same progress, and nothing is stored.
pub trait Scheduler {
    /// Computes the progress after a scheduled review.
    fn judge<Tz: TimeZone>(
        &self,
        word: &Word,
        judgment: Judgment,
        now: &DateTime<Tz>,
    ) -> Result<Progress, SchedulerError>;

    /// Sends a word back to stage 0, due now, keeping its review history.
    fn reset<Tz: TimeZone>(&self, word: &Word, now: &DateTime<Tz>) -> Progress {
        Progress {
            stage: 0,
            review_count: word.review_count,
            correct_count: word.correct_count,
            next_review_date: now.timestamp_millis(),
        }
    }

    fn preview<Tz: TimeZone>(&self, word: &Word, now: &DateTime<Tz>) -> Result<Preview, SchedulerError> {
        Ok(Preview {
            remembered: self.judge(word, Judgment::Remembered, now)?.next_review_date,
            forgotten: self.judge(word, Judgment::Forgotten, now)?.next_review_date,
        })
    }
}

/// Fixed ladder of stages: remembering climbs one rung, forgetting drops one.
#[derive(Debug, Clone, Default)]
pub struct LadderScheduler {
    intervals: Intervals,
}

impl LadderScheduler {
    pub fn new(intervals: Intervals) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &Intervals {
        &self.intervals
    }
}

impl Scheduler for LadderScheduler {
    fn judge<Tz: TimeZone>(
        &self,
        word: &Word,
        judgment: Judgment,
        now: &DateTime<Tz>,
    ) -> Result<Progress, SchedulerError> {
        if word.stage > LAST_SCHEDULED_STAGE {
            return Err(SchedulerError::InvalidStage(word.stage));
        }

        let stage = match judgment {
            Judgment::Remembered => word.stage + 1,
            Judgment::Forgotten => word.stage.saturating_sub(1),
        };
        // The interval is looked up for the stage the word lands on.
        let next_review_date = if stage == COMPLETED_STAGE {
            NEVER
        } else {
            clock::day_offset(now, self.intervals.days(stage)).timestamp_millis()
        };

        Ok(Progress {
            stage,
            review_count: word.review_count.saturating_add(1),
            correct_count: if judgment.remembered() {
                word.correct_count.saturating_add(1)
            } else {
                word.correct_count
            },
            next_review_date,
        })
    }
}
