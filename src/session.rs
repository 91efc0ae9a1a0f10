use chrono::{DateTime, Utc};
use serde::Serialize;
use snafu::ensure;

use crate::due::select_due;
use crate::error::{
    BoxError, NoPreviousCardSnafu, Result, SessionAlreadyStartedSnafu, SessionCompletedSnafu,
    SessionNotStartedSnafu, StoreSnafu,
};
use crate::item::{ReviewFeedback, ReviewStatus, SrsState, VocabularyItem};
use crate::scheduler::apply_review;

/// Persistence collaborator. The session never reaches for ambient state;
/// whoever constructs it decides where reviews are loaded from and stored.
pub trait ReviewStore {
    /// Items that may be due at `now`, with their scheduling state embedded.
    fn load_due_candidates(
        &mut self,
        now: DateTime<Utc>,
    ) -> std::result::Result<Vec<VocabularyItem>, BoxError>;

    /// Persists the post-review state of a single item.
    fn save_srs_state(
        &mut self,
        item_id: i64,
        state: &SrsState,
    ) -> std::result::Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionPhase {
    Idle,
    InProgress,
    Completed,
}

/// What a single [`ReviewSession::submit_quality`] produced. `saved == false`
/// means the store rejected the write; the session kept going and the item id
/// went on the reconciliation list.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub item_id: i64,
    pub state: SrsState,
    pub feedback: ReviewFeedback,
    pub saved: bool,
}

/// Totals for the post-session screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub total: usize,
    pub reviewed: usize,
    pub remembered: usize,
    pub not_remembered: usize,
    pub duration_secs: u32,
}

/// Drives one study session over a point-in-time due-set snapshot.
///
/// Items becoming due while the session runs are not injected; that keeps a
/// session finite. One caller drives one session; there is no internal
/// locking. A session is abandoned by dropping it.
pub struct ReviewSession<S> {
    store: S,
    snapshot: Vec<VocabularyItem>,
    phase: SessionPhase,
    current: usize,
    show_answer: bool,
    started_at: Option<DateTime<Utc>>,
    card_started_at: Option<DateTime<Utc>>,
    feedback: Vec<ReviewFeedback>,
    failed_saves: Vec<i64>,
}

impl<S: ReviewStore> ReviewSession<S> {
    /// Builds a session over an explicit snapshot, e.g. one the caller
    /// already selected with [`select_due`].
    pub fn new(store: S, snapshot: Vec<VocabularyItem>) -> Self {
        Self {
            store,
            snapshot,
            phase: SessionPhase::Idle,
            current: 0,
            show_answer: false,
            started_at: None,
            card_started_at: None,
            feedback: Vec::new(),
            failed_saves: Vec::new(),
        }
    }

    /// Loads candidates from the store and snapshots the due subset,
    /// ordered most-overdue first.
    pub fn open(mut store: S, now: DateTime<Utc>) -> Result<Self> {
        let candidates = store.load_due_candidates(now).map_err(|err| {
            StoreSnafu {
                message: err.to_string(),
            }
            .build()
        })?;
        let snapshot = select_due(&candidates, now).due;
        Ok(Self::new(store, snapshot))
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn remaining(&self) -> usize {
        self.snapshot.len() - self.current.min(self.snapshot.len())
    }

    /// The card under the cursor, mid-session only.
    pub fn current_card(&self) -> Option<&VocabularyItem> {
        match self.phase {
            SessionPhase::InProgress => self.snapshot.get(self.current),
            _ => None,
        }
    }

    pub fn answer_shown(&self) -> bool {
        self.show_answer
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Item ids whose review the store rejected, kept for later
    /// reconciliation by the collaborator.
    pub fn failed_saves(&self) -> &[i64] {
        &self.failed_saves
    }

    /// Transitions `Idle -> InProgress` and arms the timers. An empty
    /// snapshot completes immediately.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.phase {
            SessionPhase::Idle => {}
            SessionPhase::InProgress => return SessionAlreadyStartedSnafu.fail(),
            SessionPhase::Completed => return SessionCompletedSnafu.fail(),
        }
        self.started_at = Some(now);
        self.card_started_at = Some(now);
        self.current = 0;
        self.phase = if self.snapshot.is_empty() {
            SessionPhase::Completed
        } else {
            SessionPhase::InProgress
        };
        Ok(())
    }

    /// UI-only flag flip; idempotent, no phase transition.
    pub fn reveal_answer(&mut self) {
        self.show_answer = true;
    }

    /// Rates the current card, persists the new state, advances the cursor.
    ///
    /// A store failure does not halt the session: the failure is logged, the
    /// item id lands on [`failed_saves`](Self::failed_saves), and the cursor
    /// advances anyway. Study flow beats strict consistency here; the
    /// rejected write stays visible for reconciliation.
    pub fn submit_quality(&mut self, quality: u8, now: DateTime<Utc>) -> Result<StepOutcome> {
        match self.phase {
            SessionPhase::Idle => return SessionNotStartedSnafu.fail(),
            SessionPhase::Completed => return SessionCompletedSnafu.fail(),
            SessionPhase::InProgress => {}
        }

        let item = &self.snapshot[self.current];
        let time_spent = self
            .card_started_at
            .map(|since| (now - since).num_seconds().max(0) as u32);
        let prior = item
            .srs
            .clone()
            .unwrap_or_else(|| SrsState::new(now));
        let state = apply_review(&prior, quality, now)?;

        let item_id = item.id;
        let saved = match self.store.save_srs_state(item_id, &state) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to persist review for item {item_id}: {err}");
                self.failed_saves.push(item_id);
                false
            }
        };

        self.snapshot[self.current].srs = Some(state.clone());
        let feedback = ReviewFeedback::new(quality, time_spent);
        self.feedback.push(feedback.clone());

        self.current += 1;
        self.show_answer = false;
        self.card_started_at = Some(now);
        if self.current == self.snapshot.len() {
            self.phase = SessionPhase::Completed;
        }

        Ok(StepOutcome {
            item_id,
            state,
            feedback,
            saved,
        })
    }

    /// Rewinds the cursor one card and hides the answer. View-only: an
    /// already-submitted review is never reverted; rating the card again
    /// records a fresh review.
    pub fn previous(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.phase {
            SessionPhase::Idle => return SessionNotStartedSnafu.fail(),
            SessionPhase::Completed => return SessionCompletedSnafu.fail(),
            SessionPhase::InProgress => {}
        }
        ensure!(self.current > 0, NoPreviousCardSnafu);
        self.current -= 1;
        self.show_answer = false;
        self.card_started_at = Some(now);
        Ok(())
    }

    /// Ends the session early. Remaining unreviewed items are discarded;
    /// nothing beyond the already-submitted reviews is persisted.
    pub fn cancel(&mut self) {
        self.phase = SessionPhase::Completed;
    }

    pub fn summary(&self) -> SessionSummary {
        let remembered = self
            .feedback
            .iter()
            .filter(|f| f.status == ReviewStatus::Remembered)
            .count();
        SessionSummary {
            total: self.snapshot.len(),
            reviewed: self.feedback.len(),
            remembered,
            not_remembered: self.feedback.len() - remembered,
            duration_secs: self.feedback.iter().filter_map(|f| f.time_spent).sum(),
        }
    }

    /// Hands the store back, e.g. to reconcile failed saves.
    pub fn into_store(self) -> S {
        self.store
    }
}
