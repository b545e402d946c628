//! Error taxonomy for battle parsing and inference

use thiserror::Error;

/// Failures of the event bridge itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("a previous call on this side is still in flight")]
    InFlight,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BattleError {
    /// A possibility class would have been left with no candidates
    #[error("over-narrowed {what}: no candidates left after {operation}")]
    OverNarrowed { what: String, operation: String },

    #[error("contradiction: {0}")]
    Contradiction(String),

    #[error("unexpected event: expected {expected}, got {actual}")]
    UnexpectedEvent { expected: String, actual: String },

    #[error("event stream ended while expecting {0}")]
    UnexpectedEnd(String),

    #[error("event left unconsumed: {0}")]
    UnconsumedEvent(String),

    #[error("event inference contract violated: {0}")]
    InferenceContract(String),

    #[error("parser made no progress on {0}")]
    StuckParser(String),

    #[error("choice {choice} rejected as '{reason}'")]
    RejectMismatch { choice: String, reason: String },

    #[error("no legal choices left")]
    NoChoices,

    #[error("unknown pokemon: {0}")]
    UnknownPokemon(String),

    #[error("unknown {kind}: {name}")]
    UnknownData { kind: &'static str, name: String },

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("agent failed: {0}")]
    Agent(String),

    #[error("choice sender failed: {0}")]
    Sender(String),
}

pub type Result<T> = std::result::Result<T, BattleError>;
