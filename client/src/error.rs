use sleuth_battle::BattleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("malformed server frame: {0}")]
    Frame(String),

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("driver task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("outgoing message channel closed")]
    Closed,
}
