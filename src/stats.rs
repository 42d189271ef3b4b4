// src/stats.rs
// Read-only summary figures over a user's word set.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::clock;
use crate::selection;
use crate::words::{Word, COMPLETED_STAGE};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub due_today: usize,
    pub completed: usize,
    pub total_reviews: u64,
    pub total_correct: u64,
    /// Percentage in `[0, 100]`; 0 while nothing has been reviewed.
    pub accuracy: f64,
    /// Number of words at each stage 0..=7.
    pub stage_counts: [usize; COMPLETED_STAGE as usize + 1],
}

fn percentage(correct: u64, reviews: u64) -> f64 {
    if reviews == 0 {
        0.0
    } else {
        correct as f64 / reviews as f64 * 100.0
    }
}

/// Share of a single word's reviews that were remembered, as a percentage.
pub fn word_accuracy(word: &Word) -> f64 {
    percentage(u64::from(word.correct_count), u64::from(word.review_count))
}

pub fn summarize<Tz: TimeZone>(words: &[Word], now: &DateTime<Tz>) -> Summary {
    let end_of_today = clock::end_of_day(now).timestamp_millis();
    let mut summary = Summary { total: words.len(), ..Summary::default() };

    for word in words {
        summary.total_reviews += u64::from(word.review_count);
        summary.total_correct += u64::from(word.correct_count);
        if word.is_completed() {
            summary.completed += 1;
        } else if selection::is_due_by(word, end_of_today) {
            summary.due_today += 1;
        }
        let stage = usize::from(word.stage.min(COMPLETED_STAGE));
        summary.stage_counts[stage] += 1;
    }

    summary.accuracy = percentage(summary.total_correct, summary.total_reviews);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::NEVER;
    use crate::words::tests::word;
    use chrono::Utc;

    fn reviewed(id: &str, stage: u8, next: i64, reviews: u32, correct: u32) -> Word {
        let mut w = word(id, stage, next);
        w.review_count = reviews;
        w.correct_count = correct;
        w
    }

    #[test]
    fn test_accuracy_over_all_reviews() {
        let now = Utc::now();
        let words = vec![reviewed("a", 2, NEVER - 1, 10, 7), reviewed("b", 3, NEVER - 1, 4, 4)];
        let summary = summarize(&words, &now);
        assert_eq!(summary.total_reviews, 14);
        assert_eq!(summary.total_correct, 11);
        assert!((summary.accuracy - 11.0 / 14.0 * 100.0).abs() < 1e-9);
        assert_eq!(format!("{:.1}", summary.accuracy), "78.6");
    }

    #[test]
    fn test_accuracy_without_reviews_is_zero() {
        let summary = summarize(&[word("a", 0, 0)], &Utc::now());
        assert_eq!(summary.accuracy, 0.0);
        assert!(!summary.accuracy.is_nan());
        assert_eq!(summarize(&[], &Utc::now()), Summary::default());
    }

    #[test]
    fn test_counts() {
        let now = Utc::now();
        let words = vec![
            word("due", 1, 0),
            word("later", 4, NEVER - 1),
            word("done", 7, NEVER),
            word("also-done", 7, NEVER),
        ];
        let summary = summarize(&words, &now);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.due_today, 1);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.stage_counts, [0, 1, 0, 0, 1, 0, 0, 2]);
    }

    #[test]
    fn test_due_today_matches_review_queue() {
        let now = Utc::now();
        let end = clock::end_of_day(&now).timestamp_millis();
        let words = vec![
            word("edge", 2, end),
            word("past-edge", 2, end + 1),
            word("done-but-dated", 7, 0),
            word("new", 0, 0),
        ];
        let queue = selection::due_words(&words, &selection::GroupFilter::All, &now);
        assert_eq!(summarize(&words, &now).due_today, queue.len());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_word_accuracy() {
        assert_eq!(word_accuracy(&reviewed("a", 0, 0, 4, 3)), 75.0);
        assert_eq!(word_accuracy(&word("b", 0, 0)), 0.0);
    }
}
