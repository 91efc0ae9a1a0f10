use chrono::{DateTime, NaiveTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::item::VocabularyItem;

/// Aggregate counts driving the review dashboard. Recomputed on every
/// query, never persisted. `total == due_today + overdue` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DueReviewCount {
    pub total: usize,
    /// Due items scheduled sometime today.
    pub due_today: usize,
    /// Due items scheduled strictly before the start of today.
    pub overdue: usize,
}

/// The ordered due subset plus its count aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct DueSet {
    pub due: Vec<VocabularyItem>,
    pub counts: DueReviewCount,
}

// Day boundaries are UTC midnight throughout the crate.
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Selects the items ready for review at `now`.
///
/// Due means `next_review_at <= now`; items without scheduling state are due
/// immediately and get no special treatment beyond that. The result is
/// ordered most-overdue first, so the most delinquent cards come up before
/// the forgetting curve does more damage.
pub fn select_due(items: &[VocabularyItem], now: DateTime<Utc>) -> DueSet {
    let due: Vec<VocabularyItem> = items
        .iter()
        .filter(|item| item.due_at(now) <= now)
        .sorted_by_key(|item| item.due_at(now))
        .cloned()
        .collect();

    let today = start_of_day(now);
    let overdue = due.iter().filter(|item| item.due_at(now) < today).count();
    let counts = DueReviewCount {
        total: due.len(),
        due_today: due.len() - overdue,
        overdue,
    };

    DueSet { due, counts }
}
