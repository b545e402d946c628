//! Competing explanations for upcoming events.
//!
//! An [`EventInference`] is a disjunction of [`SubInference`] cases plus a
//! parser that recognises the event those cases would produce. Its parser
//! must call [`Acceptor::accept`] before consuming anything, and must
//! consume something after accepting.

use super::SubInference;
use crate::error::{BattleError, Result};
use crate::parser::{BattleParserContext, dispatch};
use crate::state::{BattleState, PokemonKey};
use async_trait::async_trait;
use sleuth_protocol::BattleEvent;
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Recognises the event an [`EventInference`] predicts
#[async_trait]
pub trait InferenceParser: Send + Sync {
    /// Look at the next event. If it is explained by one of the cases, call
    /// `accept` with that case's index and then consume it.
    async fn parse(&self, ctx: &mut BattleParserContext, accept: &mut Acceptor) -> Result<()>;
}

/// The `accept` callback handed to an [`InferenceParser`]
#[derive(Debug)]
pub struct Acceptor {
    cases: usize,
    started_at: u64,
    accepted: Option<usize>,
}

impl Acceptor {
    fn new(cases: usize, started_at: u64) -> Self {
        Acceptor {
            cases,
            started_at,
            accepted: None,
        }
    }

    /// Declare that case `case` explains the next event
    pub fn accept(&mut self, ctx: &BattleParserContext, case: usize) -> Result<()> {
        if case >= self.cases {
            return Err(BattleError::InferenceContract(format!(
                "accepted case {case} of {}",
                self.cases
            )));
        }
        if self.accepted.is_some() {
            return Err(BattleError::InferenceContract("accepted twice".to_string()));
        }
        if ctx.consumed() != self.started_at {
            return Err(BattleError::InferenceContract(
                "accepted after consuming".to_string(),
            ));
        }
        self.accepted = Some(case);
        Ok(())
    }

    /// Check the contract once the parser returned
    fn finish(&self, consumed: u64) -> Result<Option<usize>> {
        let progressed = consumed != self.started_at;
        match (self.accepted, progressed) {
            (Some(_), false) => Err(BattleError::InferenceContract(
                "accepted without consuming".to_string(),
            )),
            (None, true) => Err(BattleError::InferenceContract(
                "consumed without accepting".to_string(),
            )),
            (accepted, _) => Ok(accepted),
        }
    }
}

pub struct EventInference {
    label: String,
    cases: Vec<SubInference>,
    parser: Box<dyn InferenceParser>,
    priority: i32,
    /// Rejection is skipped if this pokemon fainted before it could act
    subject: Option<PokemonKey>,
}

impl fmt::Debug for EventInference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventInference")
            .field("label", &self.label)
            .field("cases", &self.cases)
            .field("priority", &self.priority)
            .finish()
    }
}

impl EventInference {
    pub fn new(
        label: impl Into<String>,
        cases: Vec<SubInference>,
        parser: impl InferenceParser + 'static,
    ) -> Self {
        EventInference {
            label: label.into(),
            cases,
            parser: Box::new(parser),
            priority: 0,
            subject: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_subject(mut self, subject: PokemonKey) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cases(&self) -> &[SubInference] {
        &self.cases
    }

    pub fn subject(&self) -> Option<PokemonKey> {
        self.subject
    }

    /// Case `accepted` happened, every sibling did not
    fn resolve(self, state: &mut BattleState, accepted: usize) -> Result<()> {
        debug!(inference = %self.label, case = accepted, "inference accepted");
        for (i, case) in self.cases.iter().enumerate() {
            if i == accepted {
                case.accept(state)?;
            }
        }
        for (i, case) in self.cases.iter().enumerate() {
            if i != accepted {
                case.reject(state)?;
            }
        }
        Ok(())
    }

    /// None of the cases happened
    pub fn reject(self, state: &mut BattleState) -> Result<()> {
        if let Some(subject) = self.subject
            && state.pokemon(subject)?.is_fainted()
        {
            debug!(inference = %self.label, "subject fainted, inference dropped");
            return Ok(());
        }
        debug!(inference = %self.label, "inference rejected");
        for case in &self.cases {
            case.reject(state)?;
        }
        Ok(())
    }
}

/// Keep only cases that are still open: possible, and not already certain
pub fn open_cases(
    state: &BattleState,
    cases: impl IntoIterator<Item = SubInference>,
) -> Result<Vec<SubInference>> {
    let mut open = Vec::new();
    for case in cases {
        if case.is_possible(state)? && !case.is_certain(state)? {
            open.push(case);
        }
    }
    Ok(open)
}

/// Offer the next event to each pending inference, highest priority
/// first. Returns whether one of them accepted it.
pub async fn try_inferences(
    ctx: &mut BattleParserContext,
    pending: &mut Vec<EventInference>,
) -> Result<bool> {
    if ctx.try_peek().await?.is_none() {
        return Ok(false);
    }
    for i in 0..pending.len() {
        let started_at = ctx.consumed();
        let mut acceptor = Acceptor::new(pending[i].cases.len(), started_at);
        pending[i].parser.parse(ctx, &mut acceptor).await?;
        if let Some(case) = acceptor.finish(ctx.consumed())? {
            let inference = pending.remove(i);
            inference.resolve(&mut ctx.state, case)?;
            ctx.state.settle_inferences()?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Let `inferences` explain as many of the following events as they can.
/// Stops at the first event none of them accepts. Unaccepted inferences
/// are rejected when `reject_unaccepted`, otherwise returned.
pub async fn expect_events(
    ctx: &mut BattleParserContext,
    mut inferences: Vec<EventInference>,
    reject_unaccepted: bool,
) -> Result<Vec<EventInference>> {
    inferences.sort_by_key(|inference| Reverse(inference.priority));
    while !inferences.is_empty() && try_inferences(ctx, &mut inferences).await? {}

    if reject_unaccepted {
        reject_all(&mut ctx.state, inferences)?;
        return Ok(Vec::new());
    }
    Ok(inferences)
}

/// Like [`expect_events`], but events no inference accepts are handled
/// normally as long as `in_window` allows them. `observe` sees every event
/// of the window before it is handled. Returns the unaccepted inferences.
pub async fn inference_window(
    ctx: &mut BattleParserContext,
    mut inferences: Vec<EventInference>,
    in_window: fn(&BattleState, &BattleEvent) -> bool,
    observe: &mut (dyn FnMut(&BattleState, &BattleEvent) + Send),
) -> Result<Vec<EventInference>> {
    inferences.sort_by_key(|inference| Reverse(inference.priority));
    loop {
        let Some(event) = ctx.try_peek().await? else {
            break;
        };
        if !in_window(&ctx.state, &event) {
            break;
        }
        observe(&ctx.state, &event);
        if !inferences.is_empty() && try_inferences(ctx, &mut inferences).await? {
            continue;
        }

        dispatch(ctx).await?;
        ctx.state.settle_inferences()?;
        match ctx.try_peek().await? {
            Some(next) if Arc::ptr_eq(&event, &next) => break,
            Some(_) => {}
            None => break,
        }
    }
    Ok(inferences)
}

/// Reject every inference, then settle what that decided
pub fn reject_all(state: &mut BattleState, inferences: Vec<EventInference>) -> Result<()> {
    for inference in inferences {
        inference.reject(state)?;
    }
    state.settle_inferences()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{AbilityReason, ItemReason};
    use crate::parser::ParserFuture;
    use crate::parser::testing::{Harness, opponent, state_with};
    use sleuth_protocol::{EventKind, SideId};

    const HEAL: &str = "|-heal|p2a: Snorlax|56/100|[from] item: Leftovers";

    /// Accepts `case` when the next event is of `kind`
    struct AcceptOn {
        kind: EventKind,
        case: usize,
    }

    #[async_trait]
    impl InferenceParser for AcceptOn {
        async fn parse(&self, ctx: &mut BattleParserContext, accept: &mut Acceptor) -> Result<()> {
            if ctx.peek().await?.kind() == self.kind {
                accept.accept(ctx, self.case)?;
                ctx.consume()?;
            }
            Ok(())
        }
    }

    /// Claims every event but leaves it in the stream
    struct AcceptOnly;

    #[async_trait]
    impl InferenceParser for AcceptOnly {
        async fn parse(&self, ctx: &mut BattleParserContext, accept: &mut Acceptor) -> Result<()> {
            ctx.peek().await?;
            accept.accept(ctx, 0)
        }
    }

    /// Eats every event without claiming it
    struct ConsumeOnly;

    #[async_trait]
    impl InferenceParser for ConsumeOnly {
        async fn parse(&self, ctx: &mut BattleParserContext, _: &mut Acceptor) -> Result<()> {
            ctx.peek().await?;
            ctx.consume()?;
            Ok(())
        }
    }

    fn snorlax() -> BattleState {
        let mut state = state_with();
        opponent(&mut state, "Snorlax", "Snorlax, L80");
        state
    }

    fn foe(ctx: &BattleParserContext) -> Result<PokemonKey> {
        ctx.state
            .active_key(SideId::P2)
            .ok_or_else(|| BattleError::Contradiction("no opposing pokemon".to_string()))
    }

    fn holds(
        label: &str,
        key: PokemonKey,
        item: &str,
        parser: impl InferenceParser + 'static,
    ) -> EventInference {
        EventInference::new(
            label,
            vec![SubInference::new(vec![ItemReason::have(key, [item])])],
            parser,
        )
    }

    fn accept_without_consuming(ctx: &mut BattleParserContext) -> ParserFuture<'_, ()> {
        Box::pin(async move {
            let key = foe(ctx)?;
            let mut pending = vec![holds("leftovers", key, "leftovers", AcceptOnly)];
            try_inferences(ctx, &mut pending).await?;
            Ok(())
        })
    }

    fn consume_without_accepting(ctx: &mut BattleParserContext) -> ParserFuture<'_, ()> {
        Box::pin(async move {
            let key = foe(ctx)?;
            let mut pending = vec![holds("leftovers", key, "leftovers", ConsumeOnly)];
            try_inferences(ctx, &mut pending).await?;
            Ok(())
        })
    }

    /// Three item guesses that all recognise a heal
    fn competing_heals(ctx: &mut BattleParserContext) -> ParserFuture<'_, ()> {
        Box::pin(async move {
            let key = foe(ctx)?;
            let heal = |case| AcceptOn {
                kind: EventKind::Heal,
                case,
            };
            let inferences = vec![
                holds("black sludge", key, "blacksludge", heal(0)).with_priority(1),
                holds("shell bell", key, "shellbell", heal(0)),
                holds("leftovers", key, "leftovers", heal(0)).with_priority(2),
            ];
            let left = expect_events(ctx, inferences, false).await?;
            if left.len() != 2 {
                return Err(BattleError::Contradiction(format!("{} left over", left.len())));
            }
            Ok(())
        })
    }

    /// A heal and a status guess, then whatever follows is left alone
    fn heal_then_stop(ctx: &mut BattleParserContext) -> ParserFuture<'_, ()> {
        Box::pin(async move {
            let key = foe(ctx)?;
            let status = EventInference::new(
                "thick fat status",
                vec![SubInference::new(vec![AbilityReason::have(key, ["thickfat"])])],
                AcceptOn {
                    kind: EventKind::Status,
                    case: 0,
                },
            );
            let heal = holds(
                "leftovers",
                key,
                "leftovers",
                AcceptOn {
                    kind: EventKind::Heal,
                    case: 0,
                },
            );
            let left = expect_events(ctx, vec![status, heal], true).await?;
            if !left.is_empty() {
                return Err(BattleError::Contradiction("inferences survived".to_string()));
            }
            ctx.consume_expected(EventKind::Turn).await?;
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_accepting_without_consuming_breaks_the_contract() {
        let harness = Harness::with_parser(snorlax(), accept_without_consuming);
        let fed = harness.feed(&[HEAL]).await;
        assert!(matches!(fed, Err(BattleError::InferenceContract(_))));

        let (ctx, result) = harness.finish().await;
        assert!(matches!(result, Err(BattleError::InferenceContract(_))));
        let key = foe(&ctx).unwrap();
        assert!(!ctx.state.pokemon(key).unwrap().item.is_definite());
    }

    #[tokio::test]
    async fn test_consuming_without_accepting_breaks_the_contract() {
        let harness = Harness::with_parser(snorlax(), consume_without_accepting);
        let fed = harness.feed(&[HEAL]).await;
        assert!(matches!(fed, Err(BattleError::InferenceContract(_))));

        let (_, result) = harness.finish().await;
        assert!(matches!(result, Err(BattleError::InferenceContract(_))));
    }

    #[tokio::test]
    async fn test_one_event_resolves_one_inference() {
        let harness = Harness::with_parser(snorlax(), competing_heals);
        harness.feed(&[HEAL]).await.unwrap();

        let (ctx, result) = harness.finish().await;
        result.unwrap();
        let key = foe(&ctx).unwrap();
        let item = &ctx.state.pokemon(key).unwrap().item;
        assert_eq!(item.definite_value().map(String::as_str), Some("leftovers"));
    }

    #[tokio::test]
    async fn test_expect_events_rejects_what_did_not_happen() {
        let harness = Harness::with_parser(snorlax(), heal_then_stop);
        harness.feed(&[HEAL, "|turn|2"]).await.unwrap();

        let (ctx, result) = harness.finish().await;
        result.unwrap();
        assert_eq!(ctx.consumed(), 2);
        let key = foe(&ctx).unwrap();
        assert_eq!(ctx.state.known_ability(key), Some("immunity"));
        let item = &ctx.state.pokemon(key).unwrap().item;
        assert_eq!(item.definite_value().map(String::as_str), Some("leftovers"));
    }
}
