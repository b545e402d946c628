//! Choosing what to do when the battle asks: the capabilities a battle is
//! driven with, the legal-choice computation, and the send/retry loop.

mod choices;
mod decide;

pub use choices::get_choices;
pub use decide::decide;

use crate::state::BattleState;
use async_trait::async_trait;
use sleuth_protocol::Choice;

/// Orders the legal choices by preference, best first.
///
/// Called once per decision, and again after a rejection that taught the
/// state something new.
#[async_trait]
pub trait BattleAgent: Send {
    async fn decide(&mut self, state: &BattleState, choices: &mut Vec<Choice>) -> anyhow::Result<()>;
}

/// How the server answered a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderResult {
    Accepted,
    /// Rejected for a reason the state cannot learn from
    Rejected,
    /// The chosen move is disabled by an effect the state does not know of
    Disabled,
    /// The active pokemon cannot switch out
    Trapped,
}

/// Delivers a choice to the server and reports how it was answered
#[async_trait]
pub trait ChoiceSender: Send {
    async fn send(&mut self, choice: Choice) -> anyhow::Result<SenderResult>;
}
