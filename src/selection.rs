// src/selection.rs
// Decides which words are up for review and draws the next one to show.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, TimeZone};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::words::{Word, COMPLETED_STAGE, DEFAULT_GROUP_ID, LAST_SCHEDULED_STAGE};

/// Which side of the word is shown as the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    FrontToBack,
    BackToFront,
}

impl Direction {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Direction::FrontToBack
        } else {
            Direction::BackToFront
        }
    }
}

/// A word drawn for the user together with the direction it is asked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub word: Word,
    pub direction: Direction,
}

impl Presentation {
    pub fn question(&self) -> &str {
        match self.direction {
            Direction::FrontToBack => &self.word.front,
            Direction::BackToFront => &self.word.back,
        }
    }

    pub fn answer(&self) -> &str {
        match self.direction {
            Direction::FrontToBack => &self.word.back,
            Direction::BackToFront => &self.word.front,
        }
    }
}

/// Restricts a selection to one group of words.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Ungrouped,
    Group(String),
}

impl GroupFilter {
    /// Maps a group id as the user picks it; "default" stands for every word.
    pub fn from_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            None | Some("") | Some(DEFAULT_GROUP_ID) => GroupFilter::All,
            Some(id) => GroupFilter::Group(id.to_string()),
        }
    }

    pub fn matches(&self, word: &Word) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Ungrouped => word.group_key().is_none(),
            GroupFilter::Group(id) => word.group_key() == Some(id.as_str()),
        }
    }
}

/// The stages a practice run draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageFilter {
    Range(RangeInclusive<u8>),
    Set(BTreeSet<u8>),
}

impl Default for StageFilter {
    fn default() -> Self {
        StageFilter::Range(0..=LAST_SCHEDULED_STAGE)
    }
}

impl StageFilter {
    pub fn range(min: u8, max: u8) -> Self {
        StageFilter::Range(min.min(max)..=max.max(min).min(COMPLETED_STAGE))
    }

    pub fn set<I: IntoIterator<Item = u8>>(stages: I) -> Self {
        StageFilter::Set(stages.into_iter().filter(|s| *s <= COMPLETED_STAGE).collect())
    }

    /// Parses "3", "0-6" or "0,2,7".
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some((min, max)) = text.split_once('-') {
            return Some(Self::range(min.trim().parse().ok()?, max.trim().parse().ok()?));
        }
        let stages = text
            .split(',')
            .map(|s| s.trim().parse::<u8>().ok())
            .collect::<Option<Vec<u8>>>()?;
        Some(Self::set(stages))
    }

    pub fn contains(&self, stage: u8) -> bool {
        match self {
            StageFilter::Range(range) => range.contains(&stage),
            StageFilter::Set(stages) => stages.contains(&stage),
        }
    }
}

/// What the user asked to drill outside the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeFilter {
    pub stages: StageFilter,
    pub group: GroupFilter,
    /// A fixed question direction; `None` picks one at random each time.
    pub direction: Option<Direction>,
}

impl PracticeFilter {
    pub fn matches(&self, word: &Word) -> bool {
        self.stages.contains(word.stage) && self.group.matches(word)
    }
}

/// Whether a word is up for scheduled review at `now`.
///
/// Anything due before the end of today counts, so words scheduled for
/// later today show up as soon as a session starts.
pub fn is_due<Tz: TimeZone>(word: &Word, now: &DateTime<Tz>) -> bool {
    is_due_by(word, clock::end_of_day(now).timestamp_millis())
}

/// Due check against a precomputed end-of-today boundary, for callers scanning many words.
pub(crate) fn is_due_by(word: &Word, end_of_today: i64) -> bool {
    !word.is_completed() && word.next_review_date <= end_of_today
}

/// Every word that is due at `now` and passes `group`.
pub fn due_words<'a, Tz: TimeZone>(
    words: &'a [Word],
    group: &GroupFilter,
    now: &DateTime<Tz>,
) -> Vec<&'a Word> {
    let end_of_today = clock::end_of_day(now).timestamp_millis();
    words
        .iter()
        .filter(|w| is_due_by(w, end_of_today) && group.matches(w))
        .collect()
}

/// Draws one due word at random, with a random question direction.
/// `None` means nothing is left to review today.
pub fn pick_due<R: Rng + ?Sized, Tz: TimeZone>(
    words: &[Word],
    group: &GroupFilter,
    rng: &mut R,
    now: &DateTime<Tz>,
) -> Option<Presentation> {
    let pool = due_words(words, group, now);
    let word = (*pool.choose(rng)?).clone();
    Some(Presentation { word, direction: Direction::random(rng) })
}

/// Every word passing the practice filter, regardless of due date.
pub fn practice_words<'a>(words: &'a [Word], filter: &PracticeFilter) -> Vec<&'a Word> {
    words.iter().filter(|w| filter.matches(w)).collect()
}

/// Draws one word for free practice. `None` when the filter matches nothing.
pub fn pick_practice<R: Rng + ?Sized>(
    words: &[Word],
    filter: &PracticeFilter,
    rng: &mut R,
) -> Option<Presentation> {
    let pool = practice_words(words, filter);
    let word = (*pool.choose(rng)?).clone();
    let direction = filter.direction.unwrap_or_else(|| Direction::random(rng));
    Some(Presentation { word, direction })
}
