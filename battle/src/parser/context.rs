use super::bridge::EventReader;
use crate::decision::{BattleAgent, ChoiceSender};
use crate::error::{BattleError, Result};
use crate::state::BattleState;
use sleuth_protocol::{BattleEvent, EventKind};
use std::sync::Arc;

/// Where the current turn stands with respect to end-of-turn effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum TurnPhase {
    /// Moves and switches
    #[default]
    Actions,
    /// Inside the residual inference window
    Residual,
    /// Residual inferences resolved, waiting for `|upkeep|`
    ResidualDone,
}

/// Everything a parser needs: the belief state, the decision
/// capabilities, and the event stream.
pub struct BattleParserContext {
    pub state: BattleState,
    pub agent: Box<dyn BattleAgent>,
    pub sender: Box<dyn ChoiceSender>,
    events: EventReader,
    pub(crate) phase: TurnPhase,
}

impl BattleParserContext {
    pub fn new(
        state: BattleState,
        agent: Box<dyn BattleAgent>,
        sender: Box<dyn ChoiceSender>,
        events: EventReader,
    ) -> Self {
        BattleParserContext {
            state,
            agent,
            sender,
            events,
            phase: TurnPhase::default(),
        }
    }

    /// Next event, or None at the end of the stream
    pub async fn try_peek(&mut self) -> Result<Option<Arc<BattleEvent>>> {
        self.events.peek().await
    }

    /// Next event, failing at the end of the stream
    pub async fn peek(&mut self) -> Result<Arc<BattleEvent>> {
        self.try_peek()
            .await?
            .ok_or_else(|| BattleError::UnexpectedEnd("an event".to_string()))
    }

    /// Next event, which must be of kind `kind`
    pub async fn verify(&mut self, kind: EventKind) -> Result<Arc<BattleEvent>> {
        let event = self
            .try_peek()
            .await?
            .ok_or_else(|| BattleError::UnexpectedEnd(kind.to_string()))?;
        if event.kind() != kind {
            return Err(BattleError::UnexpectedEvent {
                expected: kind.to_string(),
                actual: event.kind().to_string(),
            });
        }
        Ok(event)
    }

    /// Commit to the event last peeked
    pub fn consume(&mut self) -> Result<Arc<BattleEvent>> {
        self.events
            .consume()
            .ok_or_else(|| BattleError::UnexpectedEnd("a peeked event to consume".to_string()))
    }

    /// Verify and consume in one step
    pub async fn consume_expected(&mut self, kind: EventKind) -> Result<Arc<BattleEvent>> {
        self.verify(kind).await?;
        self.consume()
    }

    /// Events consumed so far
    pub fn consumed(&self) -> u64 {
        self.events.consumed()
    }

    /// Stop reading; the feeder is told the parser is done
    pub fn close(&mut self) {
        self.events.close();
    }

    /// Fail the stream so the feeder sees `error` too
    pub fn fail(&mut self, error: BattleError) {
        self.events.throw(error);
    }
}
