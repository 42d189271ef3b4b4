// src/words/mod.rs
// Vocabulary records and the groups that partition them.

pub mod import;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stage of a word that has graduated and is no longer scheduled.
pub const COMPLETED_STAGE: u8 = 7;
/// Highest stage that still takes part in scheduled review.
pub const LAST_SCHEDULED_STAGE: u8 = COMPLETED_STAGE - 1;
/// Id of the synthetic group meaning "all words". Never persisted.
pub const DEFAULT_GROUP_ID: &str = "default";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WordError {
    #[error("front text must not be empty")]
    EmptyFront,

    #[error("back text must not be empty")]
    EmptyBack,
}

/// A learned vocabulary item as handed out by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub stage: u8,
    pub review_count: u32,
    pub correct_count: u32,
    /// Epoch milliseconds, or [`crate::clock::NEVER`] once completed.
    pub next_review_date: i64,
    pub created_at: i64,
}

/// The scheduling fields that always change together in one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: u8,
    pub review_count: u32,
    pub correct_count: u32,
    pub next_review_date: i64,
}

impl Word {
    pub fn progress(&self) -> Progress {
        Progress {
            stage: self.stage,
            review_count: self.review_count,
            correct_count: self.correct_count,
            next_review_date: self.next_review_date,
        }
    }

    /// Returns a copy of this word carrying `progress`.
    pub fn with_progress(&self, progress: Progress) -> Word {
        Word {
            stage: progress.stage,
            review_count: progress.review_count,
            correct_count: progress.correct_count,
            next_review_date: progress.next_review_date,
            ..self.clone()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.stage >= COMPLETED_STAGE
    }

    /// The group this word belongs to, with "default" folded into ungrouped.
    pub fn group_key(&self) -> Option<&str> {
        match self.group_id.as_deref() {
            None | Some(DEFAULT_GROUP_ID) | Some("") => None,
            Some(id) => Some(id),
        }
    }
}

/// A word that has not been stored yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub front: String,
    pub back: String,
    pub pronunciation: Option<String>,
    pub example: Option<String>,
    pub group_id: Option<String>,
    pub stage: u8,
    pub review_count: u32,
    pub correct_count: u32,
    pub next_review_date: i64,
    pub created_at: i64,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl NewWord {
    /// A brand-new word: stage 0, no reviews, due immediately.
    pub fn fresh(front: &str, back: &str, now_ms: i64) -> Result<Self, WordError> {
        let front = front.trim();
        let back = back.trim();
        if front.is_empty() {
            return Err(WordError::EmptyFront);
        }
        if back.is_empty() {
            return Err(WordError::EmptyBack);
        }
        Ok(Self {
            front: front.to_string(),
            back: back.to_string(),
            pronunciation: None,
            example: None,
            group_id: None,
            stage: 0,
            review_count: 0,
            correct_count: 0,
            next_review_date: now_ms,
            created_at: now_ms,
        })
    }

    pub fn with_pronunciation(mut self, pronunciation: Option<&str>) -> Self {
        self.pronunciation = trimmed(pronunciation);
        self
    }

    pub fn with_example(mut self, example: Option<&str>) -> Self {
        self.example = trimmed(example);
        self
    }

    /// Assigns a group. The synthetic "default" group is stored as no group.
    pub fn with_group(mut self, group_id: Option<&str>) -> Self {
        self.group_id = trimmed(group_id).filter(|id| id != DEFAULT_GROUP_ID);
        self
    }

    pub fn into_word(self, id: String) -> Word {
        Word {
            id,
            front: self.front,
            back: self.back,
            pronunciation: self.pronunciation,
            example: self.example,
            group_id: self.group_id,
            stage: self.stage,
            review_count: self.review_count,
            correct_count: self.correct_count,
            next_review_date: self.next_review_date,
            created_at: self.created_at,
        }
    }
}

/// A partial update. `None` leaves a field untouched; for the optional
/// annotations `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordPatch {
    pub front: Option<String>,
    pub back: Option<String>,
    pub pronunciation: Option<Option<String>>,
    pub example: Option<Option<String>>,
    pub group_id: Option<Option<String>>,
    pub stage: Option<u8>,
    pub review_count: Option<u32>,
    pub correct_count: Option<u32>,
    pub next_review_date: Option<i64>,
}

impl WordPatch {
    pub fn apply(&self, word: &mut Word) {
        if let Some(front) = &self.front {
            word.front = front.clone();
        }
        if let Some(back) = &self.back {
            word.back = back.clone();
        }
        if let Some(pronunciation) = &self.pronunciation {
            word.pronunciation = pronunciation.clone();
        }
        if let Some(example) = &self.example {
            word.example = example.clone();
        }
        if let Some(group_id) = &self.group_id {
            word.group_id = group_id.clone();
        }
        if let Some(stage) = self.stage {
            word.stage = stage;
        }
        if let Some(review_count) = self.review_count {
            word.review_count = review_count;
        }
        if let Some(correct_count) = self.correct_count {
            word.correct_count = correct_count;
        }
        if let Some(next_review_date) = self.next_review_date {
            word.next_review_date = next_review_date;
        }
    }
}

impl From<Progress> for WordPatch {
    fn from(progress: Progress) -> Self {
        Self {
            stage: Some(progress.stage),
            review_count: Some(progress.review_count),
            correct_count: Some(progress.correct_count),
            next_review_date: Some(progress.next_review_date),
            ..Self::default()
        }
    }
}

/// A user-defined collection of words. `order` decides display precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub created_at: i64,
}

impl Group {
    /// The virtual "all words" group.
    pub fn synthetic_default() -> Self {
        Self {
            id: DEFAULT_GROUP_ID.to_string(),
            name: "All".to_string(),
            order: -1,
            created_at: 0,
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_GROUP_ID
    }
}

/// Prepends the synthetic default group to a stored group list.
pub fn with_default_group(groups: Vec<Group>) -> Vec<Group> {
    let mut all = Vec::with_capacity(groups.len() + 1);
    all.push(Group::synthetic_default());
    all.extend(groups.into_iter().filter(|g| !g.is_default()));
    all
}

/// Words ordered for the list view, most recently added first.
pub fn newest_first(words: &[Word]) -> Vec<&Word> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Case-insensitive search over the text fields of each word.
pub fn search<'a>(words: &'a [Word], query: &str) -> Vec<&'a Word> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return words.iter().collect();
    }
    words
        .iter()
        .filter(|w| {
            w.front.to_lowercase().contains(&needle)
                || w.back.to_lowercase().contains(&needle)
                || w
                    .pronunciation
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A stored word with the given scheduling state, for tests across the crate.
    pub(crate) fn word(id: &str, stage: u8, next_review_date: i64) -> Word {
        Word {
            id: id.to_string(),
            front: format!("front {}", id),
            back: format!("back {}", id),
            pronunciation: None,
            example: None,
            group_id: None,
            stage,
            review_count: 0,
            correct_count: 0,
            next_review_date,
            created_at: 0,
        }
    }

    #[test]
    fn test_fresh_word_is_due_now() {
        let new = NewWord::fresh("  猫 ", " cat", 1_000).unwrap();
        assert_eq!(new.front, "猫");
        assert_eq!(new.back, "cat");
        assert_eq!(new.stage, 0);
        assert_eq!(new.review_count, 0);
        assert_eq!(new.correct_count, 0);
        assert_eq!(new.next_review_date, 1_000);
        assert_eq!(new.created_at, 1_000);
    }

    #[test]
    fn test_fresh_word_rejects_blank_text() {
        assert_eq!(NewWord::fresh(" ", "cat", 0), Err(WordError::EmptyFront));
        assert_eq!(NewWord::fresh("猫", "", 0), Err(WordError::EmptyBack));
    }

    #[test]
    fn test_default_group_is_stored_as_ungrouped() {
        let new = NewWord::fresh("a", "b", 0).unwrap().with_group(Some("default"));
        assert_eq!(new.group_id, None);
        let new = NewWord::fresh("a", "b", 0).unwrap().with_group(Some(" g1 "));
        assert_eq!(new.group_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_group_key_folds_default() {
        let mut w = word("1", 0, 0);
        assert_eq!(w.group_key(), None);
        w.group_id = Some("default".to_string());
        assert_eq!(w.group_key(), None);
        w.group_id = Some("verbs".to_string());
        assert_eq!(w.group_key(), Some("verbs"));
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut w = word("1", 3, 50);
        w.pronunciation = Some("neko".to_string());
        let patch = WordPatch {
            back: Some("kitty".to_string()),
            pronunciation: Some(None),
            ..WordPatch::default()
        };
        patch.apply(&mut w);
        assert_eq!(w.back, "kitty");
        assert_eq!(w.pronunciation, None);
        assert_eq!(w.front, "front 1");
        assert_eq!(w.stage, 3);
        assert_eq!(w.next_review_date, 50);
    }

    #[test]
    fn test_with_default_group_prepends_once() {
        let stored = vec![Group { id: "g1".into(), name: "Verbs".into(), order: 1, created_at: 5 }];
        let all = with_default_group(stored);
        assert_eq!(all.len(), 2);
        assert!(all[0].is_default());
        assert_eq!(all[1].id, "g1");
    }

    #[test]
    fn test_newest_first_and_search() {
        let mut a = word("a", 0, 0);
        a.created_at = 10;
        a.back = "Cat".to_string();
        let mut b = word("b", 0, 0);
        b.created_at = 20;
        let words = vec![a, b];

        let order: Vec<&str> = newest_first(&words).iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);

        let hits = search(&words, "cat");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
        assert_eq!(search(&words, "  ").len(), 2);
    }
}
