//! End-of-turn effects and the inferences they settle

use super::inferences::{self, RESIDUAL_HEAL};
use crate::error::Result;
use crate::inference::{EventInference, inference_window, reject_all};
use crate::parser::{BattleParserContext, TurnPhase};
use crate::state::BattleState;
use sleuth_protocol::{BattleEvent, EventKind};
use tracing::debug;

/// Entered on the first end-of-turn event. Every residual item or ability
/// the opposing actives could have either shows up before `|upkeep|` or is
/// ruled out.
pub(crate) async fn residual_window(ctx: &mut BattleParserContext) -> Result<()> {
    ctx.phase = TurnPhase::Residual;
    let pending = inferences::residual(&ctx.state)?;
    let unaccepted = inference_window(ctx, pending, in_residual, &mut |_, _| {}).await?;

    let at_upkeep = matches!(
        ctx.try_peek().await?.as_deref(),
        Some(BattleEvent::Upkeep)
    );
    if at_upkeep {
        reject_residual(&mut ctx.state, unaccepted)?;
    } else if !unaccepted.is_empty() {
        debug!(open = unaccepted.len(), "residual window cut short");
    }
    ctx.phase = TurnPhase::ResidualDone;
    Ok(())
}

/// `|upkeep|` closes the turn. A turn without any residual events still
/// rules out everything that would have produced one.
pub(crate) async fn upkeep(ctx: &mut BattleParserContext) -> Result<()> {
    if ctx.phase == TurnPhase::Actions {
        let pending = inferences::residual(&ctx.state)?;
        reject_residual(&mut ctx.state, pending)?;
    }
    ctx.consume_expected(EventKind::Upkeep).await?;
    ctx.state.post_turn()?;
    ctx.phase = TurnPhase::Actions;
    Ok(())
}

fn in_residual(_: &BattleState, event: &BattleEvent) -> bool {
    !matches!(
        event.kind(),
        EventKind::Upkeep
            | EventKind::Halt
            | EventKind::Turn
            | EventKind::Request
            | EventKind::Win
            | EventKind::Tie
            | EventKind::Move
            | EventKind::Switch
            | EventKind::Drag
            | EventKind::Cant
    )
}

/// Healing items say nothing about a holder that got back to full HP
/// during the turn
fn reject_residual(state: &mut BattleState, unaccepted: Vec<EventInference>) -> Result<()> {
    let rejected = unaccepted
        .into_iter()
        .filter(|inference| {
            inference.label() != RESIDUAL_HEAL
                || !inference
                    .subject()
                    .is_some_and(|key| state.pokemon(key).is_ok_and(|p| p.hp.is_full()))
        })
        .collect();
    reject_all(state, rejected)
}
