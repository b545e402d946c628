//! Setup and turn progress: players, requests, turns, the end of the game
//! and the halts that ask for a decision.

use crate::decision;
use crate::error::Result;
use crate::parser::{BattleParserContext, TurnPhase};
use sleuth_protocol::{BattleRequest, EventKind, HaltReason, SideId};
use tracing::{debug, info, warn};

pub(crate) async fn player(ctx: &mut BattleParserContext, side: SideId, username: &str) -> Result<()> {
    ctx.consume_expected(EventKind::Player).await?;
    let state = &mut ctx.state;
    state.usernames[side.index()] = Some(username.to_string());
    if state.our_side.is_none() && state.our_username.as_deref() == Some(username) {
        debug!(%side, "identified our side from the player list");
        state.our_side = Some(side);
    }
    Ok(())
}

pub(crate) async fn team_size(ctx: &mut BattleParserContext, side: SideId, size: usize) -> Result<()> {
    ctx.consume_expected(EventKind::TeamSize).await?;
    ctx.state.team_mut(side).size = size;
    Ok(())
}

pub(crate) async fn generation(ctx: &mut BattleParserContext, generation: u8) -> Result<()> {
    ctx.consume_expected(EventKind::Gen).await?;
    if generation != 4 {
        warn!(generation, "battle is not generation 4, inferences may be wrong");
    }
    Ok(())
}

pub(crate) async fn start(ctx: &mut BattleParserContext) -> Result<()> {
    ctx.consume_expected(EventKind::Start).await?;
    info!(
        p1 = ctx.state.usernames[0].as_deref().unwrap_or("?"),
        p2 = ctx.state.usernames[1].as_deref().unwrap_or("?"),
        "battle started"
    );
    Ok(())
}

pub(crate) async fn request(ctx: &mut BattleParserContext, request: &BattleRequest) -> Result<()> {
    ctx.consume_expected(EventKind::Request).await?;
    ctx.state.reconcile_request(request)
}

pub(crate) async fn turn(ctx: &mut BattleParserContext, turn: u32) -> Result<()> {
    ctx.consume_expected(EventKind::Turn).await?;
    ctx.state.turn = turn;
    ctx.phase = TurnPhase::Actions;
    debug!(turn, "turn");
    Ok(())
}

pub(crate) async fn win(ctx: &mut BattleParserContext, winner: Option<&str>) -> Result<()> {
    match winner {
        Some(winner) => {
            ctx.consume_expected(EventKind::Win).await?;
            info!(winner, turn = ctx.state.turn, "battle won");
            ctx.state.winner = Some(winner.to_string());
        }
        None => {
            ctx.consume_expected(EventKind::Tie).await?;
            info!(turn = ctx.state.turn, "battle tied");
        }
    }
    Ok(())
}

pub(crate) async fn halt(ctx: &mut BattleParserContext, reason: HaltReason) -> Result<()> {
    ctx.consume_expected(EventKind::Halt).await?;
    match reason {
        HaltReason::GameOver => ctx.state.game_over = true,
        HaltReason::Wait => {}
        HaltReason::Switch => decision::decide(ctx, true).await?,
        HaltReason::Decide => decision::decide(ctx, false).await?,
    }
    Ok(())
}
