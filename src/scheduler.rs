use chrono::{DateTime, Duration, Utc};
use snafu::ensure;

use crate::error::{InvalidQualitySnafu, Result};
use crate::item::SrsState;

/// Easiness factor assigned to freshly schedulable items.
pub const INITIAL_EASINESS: f32 = 2.5;
/// Floor below which the easiness factor never drops.
pub const MIN_EASINESS: f32 = 1.3;
/// Lowest quality rating counted as a successful recall.
pub const PASSING_QUALITY: u8 = 3;
pub const MAX_QUALITY: u8 = 5;

const FIRST_INTERVAL: u32 = 1;
const SECOND_INTERVAL: u32 = 6;

/// SM-2 easiness update, floored at [`MIN_EASINESS`]. No ceiling.
///
/// `ef' = ef + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`
fn next_easiness(easiness: f32, quality: u8) -> f32 {
    let miss = f32::from(MAX_QUALITY - quality);
    (easiness + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASINESS)
}

/// Computes the state an item moves to after a single review at `now`.
///
/// A quality below [`PASSING_QUALITY`] resets repetitions and schedules the
/// card for tomorrow no matter how long its interval had grown. The easiness
/// factor is updated on success and failure alike. Pure function; persisting
/// the result is the caller's job.
pub fn apply_review(state: &SrsState, quality: u8, now: DateTime<Utc>) -> Result<SrsState> {
    ensure!(quality <= MAX_QUALITY, InvalidQualitySnafu { quality });

    let easiness_factor = next_easiness(state.easiness_factor, quality);
    let (repetitions, interval) = if quality < PASSING_QUALITY {
        (0, FIRST_INTERVAL)
    } else {
        let repetitions = state.repetitions + 1;
        let interval = match repetitions {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            _ => (state.interval as f32 * easiness_factor).round() as u32,
        };
        (repetitions, interval)
    };

    Ok(SrsState {
        interval,
        repetitions,
        easiness_factor,
        next_review_at: now + Duration::days(i64::from(interval)),
        last_review_at: Some(now),
        reviewed: true,
    })
}

/// The three anchor ratings the study UI exposes. The scheduler accepts the
/// full 0-5 range; these are presentation-level shortcuts, not a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RecallGrade {
    Hard,
    Medium,
    Easy,
}

impl RecallGrade {
    pub fn quality(self) -> u8 {
        match self {
            Self::Hard => 0,
            Self::Medium => 3,
            Self::Easy => MAX_QUALITY,
        }
    }
}
