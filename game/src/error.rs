use liftoff_execution::StakeError;
use thiserror::Error;

/// Errors surfaced by a game session.
///
/// Store failures are carried as text: by the time they reach the session
/// they are only ever displayed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The session could not start: missing identity, no signed-in store or
    /// the initial balance fetch failed.
    #[error("failed to load player: {0}")]
    Initialization(String),
    /// A store call failed.
    #[error("{0}")]
    Sync(String),
    #[error("invalid stake: {0}")]
    InvalidStake(StakeError),
    /// The action is not allowed in the current session state.
    #[error("{0}")]
    InternalState(String),
}

impl From<StakeError> for GameError {
    fn from(err: StakeError) -> Self {
        match err {
            StakeError::AlreadyStaked => {
                GameError::InternalState("a stake is already placed for this round".to_string())
            }
            err => GameError::InvalidStake(err),
        }
    }
}
