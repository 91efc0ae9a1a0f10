use snafu::Snafu;

/// Error type produced by [`ReviewStore`](crate::ReviewStore) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum SrsError {
    #[snafu(display("quality rating {quality} is outside the 0-5 range"))]
    InvalidQuality { quality: u8 },
    #[snafu(display("review session has not been started"))]
    SessionNotStarted,
    #[snafu(display("review session is already running"))]
    SessionAlreadyStarted,
    #[snafu(display("review session is already completed"))]
    SessionCompleted,
    #[snafu(display("no earlier card to rewind to"))]
    NoPreviousCard,
    #[snafu(display("rating weights must contain at least one positive weight"))]
    InvalidRatingWeights,
    #[snafu(display("persistence collaborator failed: {message}"))]
    Store { message: String },
}

pub type Result<T, E = SrsError> = std::result::Result<T, E>;
