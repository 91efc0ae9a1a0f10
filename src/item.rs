use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::{INITIAL_EASINESS, PASSING_QUALITY};

/// Scheduling state attached to a vocabulary item. Created with
/// [`SrsState::new`] when the item first becomes schedulable, and replaced
/// wholesale by [`apply_review`](crate::apply_review) on every review event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrsState {
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive successful reviews. Resets to zero on failure.
    pub repetitions: u32,
    pub easiness_factor: f32,
    pub next_review_at: DateTime<Utc>,
    pub last_review_at: Option<DateTime<Utc>>,
    /// True once at least one review has been recorded.
    pub reviewed: bool,
}

impl SrsState {
    /// Fresh state for an item made schedulable at `now`. Due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            interval: 0,
            repetitions: 0,
            easiness_factor: INITIAL_EASINESS,
            next_review_at: now,
            last_review_at: None,
            reviewed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: i64,
    pub word: String,
    /// Pronunciation aid (kana, pinyin, ...), when the word has one.
    pub reading: Option<String>,
    pub meaning: String,
    /// Missing state means the item was never made schedulable; such items
    /// are due immediately.
    pub srs: Option<SrsState>,
}

impl VocabularyItem {
    /// The moment this item becomes reviewable. Items without scheduling
    /// state fall back to `now`.
    pub fn due_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.srs.as_ref().map_or(now, |s| s.next_review_at)
    }
}

/// Coarse recall tag derived from the quality rating. Display only, never
/// fed back into the scheduler.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Unknown,
    Remembered,
    NotRemembered,
}

impl ReviewStatus {
    pub fn from_quality(quality: u8) -> Self {
        if quality >= PASSING_QUALITY {
            Self::Remembered
        } else {
            Self::NotRemembered
        }
    }
}

/// One answered card, as reported to the caller and the post-session screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFeedback {
    pub quality: u8,
    /// Seconds the learner spent on the card, when known.
    pub time_spent: Option<u32>,
    pub status: ReviewStatus,
}

impl ReviewFeedback {
    pub fn new(quality: u8, time_spent: Option<u32>) -> Self {
        Self {
            quality,
            time_spent,
            status: ReviewStatus::from_quality(quality),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fresh_state_is_due_immediately() {
        let now = Utc.with_ymd_and_hms(2023, 6, 1, 9, 0, 0).unwrap();
        let state = SrsState::new(now);
        assert_eq!(state.interval, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.easiness_factor, INITIAL_EASINESS);
        assert_eq!(state.next_review_at, now);
        assert_eq!(state.last_review_at, None);
        assert!(!state.reviewed);
    }

    #[test]
    fn item_without_state_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2023, 6, 1, 9, 0, 0).unwrap();
        let item = VocabularyItem {
            id: 1,
            word: "犬".into(),
            reading: Some("いぬ".into()),
            meaning: "dog".into(),
            srs: None,
        };
        assert_eq!(item.due_at(now), now);
    }

    #[test]
    fn status_follows_passing_quality() {
        assert_eq!(ReviewStatus::from_quality(0), ReviewStatus::NotRemembered);
        assert_eq!(ReviewStatus::from_quality(2), ReviewStatus::NotRemembered);
        assert_eq!(ReviewStatus::from_quality(3), ReviewStatus::Remembered);
        assert_eq!(ReviewStatus::from_quality(5), ReviewStatus::Remembered);
    }

    #[test]
    fn status_round_trips_through_wire_tags() {
        assert_eq!(ReviewStatus::NotRemembered.to_string(), "NOT_REMEMBERED");
        assert_eq!(
            "REMEMBERED".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::Remembered
        );
    }
}
