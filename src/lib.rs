mod due;
mod error;
mod item;
mod scheduler;
mod session;
mod simulation;

pub use due::{DueReviewCount, DueSet, select_due};
pub use error::{BoxError, Result, SrsError};
pub use item::{ReviewFeedback, ReviewStatus, SrsState, VocabularyItem};
pub use scheduler::{
    INITIAL_EASINESS, MAX_QUALITY, MIN_EASINESS, PASSING_QUALITY, RecallGrade, apply_review,
};
pub use session::{ReviewSession, ReviewStore, SessionPhase, SessionSummary, StepOutcome};
pub use simulation::{SimulationResult, SimulatorConfig, simulate};
